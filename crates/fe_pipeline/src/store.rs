//! Catalog snapshots and their owner.
//!
//! A `CatalogSnapshot` is immutable once built. `CatalogStore` publishes a new
//! snapshot by swapping the `Arc` it holds; readers clone the `Arc` and keep a
//! consistent catalog for the whole request, even across a concurrent refresh.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::Serialize;

use fe_core::{Catalog, Role};
use fe_io::hasher::{sha256_canonical, short_hex};
use fe_io::loader::load_raw_table;
use fe_io::normalize::{normalize, DropStats, HeaderSynonyms, RawTable};

use crate::summary::apply_price_list;
use crate::PipelineError;

#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub catalog: Catalog,
    /// SHA-256 over the canonical JSON of `catalog`.
    pub digest: String,
    pub dropped: DropStats,
    /// Candidates whose price came from a price list.
    pub repriced: usize,
    /// Name → credits, when a price list was applied.
    pub price_list: Option<BTreeMap<String, f64>>,
}

/// Shape of a snapshot, for `--validate-only` style reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogReport {
    pub catalog_sha256: String,
    pub candidates: usize,
    pub per_role: BTreeMap<Role, usize>,
    pub dropped: DropStats,
    pub repriced: usize,
}

impl CatalogSnapshot {
    /// Normalize `table`, apply `price_list`, build the catalog and its digest.
    pub fn build(
        table: &RawTable,
        synonyms: &HeaderSynonyms,
        price_list: Option<BTreeMap<String, f64>>,
    ) -> Result<Self, PipelineError> {
        let mut normalized = normalize(table, synonyms)?;
        let repriced = match &price_list {
            Some(list) => apply_price_list(&mut normalized.candidates, list),
            None => 0,
        };
        let catalog = Catalog::from_candidates(normalized.candidates);
        let digest = sha256_canonical(&catalog)?;
        Ok(Self { catalog, digest, dropped: normalized.dropped, repriced, price_list })
    }

    pub fn report(&self) -> CatalogReport {
        CatalogReport {
            catalog_sha256: self.digest.clone(),
            candidates: self.catalog.len(),
            per_role: self.catalog.role_counts(),
            dropped: self.dropped,
            repriced: self.repriced,
        }
    }

    /// Digest prefix for log lines.
    pub fn short_digest(&self) -> &str {
        short_hex(&self.digest, 12).unwrap_or(&self.digest)
    }
}

/// Owner of the current snapshot. Starts empty.
#[derive(Debug, Default)]
pub struct CatalogStore {
    current: RwLock<Option<Arc<CatalogSnapshot>>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot; returns the published handle.
    pub fn publish(&self, snapshot: CatalogSnapshot) -> Arc<CatalogSnapshot> {
        let snap = Arc::new(snapshot);
        log::info!(
            "catalog: published {} candidates ({} dropped, {} repriced) sha256 {}",
            snap.catalog.len(),
            snap.dropped.total(),
            snap.repriced,
            snap.short_digest()
        );
        if snap.dropped.total() > 0 {
            log::warn!(
                "catalog: dropped rows: {} empty name, {} unknown role, {} invalid price",
                snap.dropped.empty_name,
                snap.dropped.unknown_role,
                snap.dropped.invalid_price
            );
        }
        // A poisoned lock still holds a whole Arc; take it over.
        let mut slot = self.current.write().unwrap_or_else(|p| p.into_inner());
        *slot = Some(Arc::clone(&snap));
        snap
    }

    /// Current snapshot handle, if any has been published.
    pub fn snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        self.current.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Load a catalog file (CSV/JSON), build a snapshot and publish it.
    pub fn load_path(
        &self,
        path: &Path,
        synonyms: &HeaderSynonyms,
        price_list: Option<BTreeMap<String, f64>>,
    ) -> Result<Arc<CatalogSnapshot>, PipelineError> {
        let table = load_raw_table(path)?;
        log::debug!("catalog: {} rows read from {}", table.rows.len(), path.display());
        let snapshot = CatalogSnapshot::build(&table, synonyms, price_list)?;
        Ok(self.publish(snapshot))
    }
}
