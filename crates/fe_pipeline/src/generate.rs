//! Request → document orchestration.
//!
//! A `Generator` holds one catalog snapshot plus the resolved configuration and
//! turns requests into `RosterDoc` / `PairDoc`. It never mutates the snapshot,
//! so one generator can serve many requests.

use std::sync::Arc;

use chrono::Utc;

use fe_algo::{allocate_pair_with, allocate_with, cheapest_composition, AllocatorConfig, PairConfig};
use fe_io::config::StrategyConfig;
use fe_io::hasher::{sha256_hex, short_hex};

use crate::docs::{PairDoc, RosterDoc};
use crate::store::CatalogSnapshot;
use crate::strategy::{resolve_spec, BudgetOverride};
use crate::PipelineError;

/// Single-roster request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub mode: String,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    /// Minted from the catalog digest when absent.
    pub seed: Option<String>,
    /// Skip the search and return the cheapest composition.
    pub cheapest: bool,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            mode: "equilibrata".to_string(),
            budget_min: None,
            budget_max: None,
            seed: None,
            cheapest: false,
        }
    }
}

impl GenerateRequest {
    fn budget(&self) -> BudgetOverride {
        BudgetOverride { min: self.budget_min, max: self.budget_max }
    }
}

/// Two-roster request. The second roster uses `second_mode` (default: the
/// first roster's mode) and seed `<seed>:b`.
#[derive(Debug, Clone, PartialEq)]
pub struct PairRequest {
    pub base: GenerateRequest,
    pub second_mode: Option<String>,
    /// Minimum fraction of the second roster not in the first, in [0, 1].
    pub min_distinct: f64,
}

pub struct Generator {
    snapshot: Arc<CatalogSnapshot>,
    config: Option<StrategyConfig>,
    allocator: AllocatorConfig,
    pair: PairConfig,
}

impl Generator {
    pub fn new(snapshot: Arc<CatalogSnapshot>) -> Self {
        Self {
            snapshot,
            config: None,
            allocator: AllocatorConfig::default(),
            pair: PairConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StrategyConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_allocator(mut self, allocator: AllocatorConfig) -> Self {
        self.pair.allocator = allocator;
        self.allocator = allocator;
        self
    }

    pub fn with_pair(mut self, pair: PairConfig) -> Self {
        self.pair = pair;
        self
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    fn seed_for(&self, req: &GenerateRequest) -> String {
        match req.seed.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => {
                let seed = mint_seed(&self.snapshot.digest);
                log::debug!("generate: minted seed {seed}");
                seed
            }
        }
    }

    pub fn generate(&self, req: &GenerateRequest) -> Result<RosterDoc, PipelineError> {
        let seed = self.seed_for(req);
        let (mode, spec) = resolve_spec(&req.mode, self.config.as_ref(), req.budget(), &seed)?;
        let snap = &self.snapshot;

        let result = if req.cheapest {
            cheapest_composition(&snap.catalog, &spec)?
        } else {
            allocate_with(&snap.catalog, &spec, &self.allocator)?
        };
        let doc = RosterDoc::build(&mode, &result, &spec, &snap.digest, snap.price_list.as_ref())?;
        log::info!(
            "generate: {} {} total {} ({}, tolerance {}, {} attempts)",
            mode,
            doc.id,
            result.roster.total(),
            result.method,
            result.satisfied_tolerance,
            result.attempts
        );
        Ok(doc)
    }

    /// Two rosters, the second drawn with the `{seed}:b` stream and pushed away
    /// from the first. The cheapest composition is deterministic, so a pair
    /// request asking for it is rejected.
    pub fn generate_pair(&self, req: &PairRequest) -> Result<PairDoc, PipelineError> {
        if req.base.cheapest {
            return Err(PipelineError::Config("cheapest composition is not available for pairs".into()));
        }
        if !(0.0..=1.0).contains(&req.min_distinct) {
            return Err(PipelineError::Config(format!(
                "min_distinct must be within [0, 1], got {}",
                req.min_distinct
            )));
        }
        let seed = self.seed_for(&req.base);
        let cfg = self.config.as_ref();
        let budget = req.base.budget();
        let (mode_a, spec_a) = resolve_spec(&req.base.mode, cfg, budget, &seed)?;
        let second_mode = req.second_mode.as_deref().unwrap_or(&req.base.mode);
        let (mode_b, spec_b) = resolve_spec(second_mode, cfg, budget, &format!("{seed}:b"))?;

        let snap = &self.snapshot;
        let pair = allocate_pair_with(&snap.catalog, &spec_a, &spec_b, req.min_distinct, &self.pair)?;

        let prices = snap.price_list.as_ref();
        let first = RosterDoc::build(&mode_a, &pair.first, &spec_a, &snap.digest, prices)?;
        let second = RosterDoc::build(&mode_b, &pair.second, &spec_b, &snap.digest, prices)?;
        let doc = PairDoc::build(first, second, &pair, req.min_distinct)?;
        log::info!(
            "generate: pair {} overlap {}/{} stage {}{}",
            doc.id,
            pair.overlap,
            pair.second.roster.len(),
            pair.stage.as_str(),
            if pair.diversity_satisfied { "" } else { " (diversity not satisfied)" }
        );
        Ok(doc)
    }
}

/// Fresh opaque seed: 16 hex chars of SHA-256 over the catalog digest and the
/// current wall-clock nanos.
pub fn mint_seed(catalog_sha256: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let digest = sha256_hex(format!("{catalog_sha256}:{nanos}").as_bytes());
    short_hex(&digest, 16).unwrap_or(&digest).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fe_core::{CandidateRecord, Catalog, Role};
    use fe_io::hasher::sha256_canonical;
    use fe_io::normalize::DropStats;

    fn snapshot() -> Arc<CatalogSnapshot> {
        let mut rows = Vec::new();
        for (role, n) in [(Role::P, 6), (Role::D, 16), (Role::C, 16), (Role::A, 12)] {
            for i in 0..n {
                let price = 4.0 + (i as f64) * 2.0;
                rows.push(
                    CandidateRecord::new(format!("{role}{i}"), "T", role, price)
                        .with_stats(6.0, 6.0 + (n - i) as f64 * 0.1, 30),
                );
            }
        }
        let catalog = Catalog::from_candidates(rows);
        let digest = sha256_canonical(&catalog).unwrap();
        Arc::new(CatalogSnapshot {
            catalog,
            digest,
            dropped: DropStats::default(),
            repriced: 0,
            price_list: None,
        })
    }

    fn quick() -> Generator {
        Generator::new(snapshot()).with_allocator(AllocatorConfig { max_tries: 40, ..Default::default() })
    }

    fn req(seed: &str) -> GenerateRequest {
        GenerateRequest { seed: Some(seed.to_string()), budget_max: Some(400.0), ..Default::default() }
    }

    #[test]
    fn same_seed_same_document_id() {
        let g = quick();
        let a = g.generate(&req("alpha")).unwrap();
        let b = g.generate(&req("alpha")).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.body.seed, "alpha");
        assert_eq!(a.body.slots.len(), 25);
        assert_eq!(a.body.catalog_sha256, g.snapshot().digest);
    }

    #[test]
    fn missing_seed_is_minted_and_echoed() {
        let g = quick();
        let doc = g.generate(&GenerateRequest { seed: Some("  ".into()), ..req("x") }).unwrap();
        assert_eq!(doc.body.seed.len(), 16);
        assert!(doc.body.seed.bytes().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn cheapest_request_skips_search() {
        let doc = quick().generate(&GenerateRequest { cheapest: true, ..req("x") }).unwrap();
        assert_eq!(doc.body.diagnostics.attempts, 0);
        assert!(doc.body.diagnostics.used_fallback);
        // 3 + 8 + 8 + 6 slots at the bottom of the price ladder.
        let floor = |n: u32| (0..n).map(|i| 4.0 + i as f64 * 2.0).sum::<f64>();
        assert_eq!(doc.body.total, floor(3) + floor(8) + floor(8) + floor(6));
    }

    #[test]
    fn pair_uses_suffixed_seed_and_validates_fraction() {
        let g = quick();
        let pair = g
            .generate_pair(&PairRequest { base: req("s"), second_mode: None, min_distinct: 0.5 })
            .unwrap();
        assert_eq!(pair.first.body.seed, "s");
        assert!(pair.second.body.seed.starts_with("s:b"));
        assert!(pair.id.starts_with("PAIR:"));
        assert!(pair.diversity.satisfied || pair.second.body.diagnostics.used_fallback);

        let err = g
            .generate_pair(&PairRequest { base: req("s"), second_mode: None, min_distinct: 1.5 })
            .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn pair_rejects_cheapest_request() {
        let base = GenerateRequest { cheapest: true, ..req("c") };
        let err = quick().generate_pair(&PairRequest { base, second_mode: None, min_distinct: 0.5 }).unwrap_err();
        assert!(matches!(err, PipelineError::Config(ref m) if m.contains("cheapest")));
    }

    #[test]
    fn minted_seeds_are_short_hex() {
        let s = mint_seed(&"a".repeat(64));
        assert_eq!(s.len(), 16);
    }
}
