//! Bucketed priority index: per-role top-K views over a catalog.
//!
//! The catalog already keeps each role bucket in priority order
//! (appearances ↓, fantasy_rating ↓, price ↓), so a view is a prefix slice.
//! The view bounds the sampler's working set to plausible picks while leaving
//! room for randomness inside it. A view is never narrower than the role's
//! quota, so a quota above `K` still samples from enough candidates.
//!
//! Pure and borrowing: nothing here copies or mutates the catalog.

use std::collections::BTreeMap;

use fe_core::{AllocationSpec, CandidateRecord, Catalog, Role};

use crate::AllocError;

/// Default bound on each role's sampling view.
pub const TOP_K: usize = 120;

#[derive(Clone, Debug)]
pub struct PriorityIndex<'a> {
    catalog: &'a Catalog,
    views: BTreeMap<Role, &'a [CandidateRecord]>,
}

impl<'a> PriorityIndex<'a> {
    /// Build views of at most `max(top_k, quota)` entries per role.
    pub fn build(catalog: &'a Catalog, spec: &AllocationSpec, top_k: usize) -> Self {
        let views = Role::ALL
            .iter()
            .map(|&role| {
                let bucket = catalog.bucket(role);
                let k = top_k.max(spec.quota(role) as usize);
                (role, &bucket[..bucket.len().min(k)])
            })
            .collect();
        Self { catalog, views }
    }

    /// Sampling view for `role` (priority order, bounded).
    pub fn view(&self, role: Role) -> &'a [CandidateRecord] {
        self.views.get(&role).copied().unwrap_or(&[])
    }

    /// Fail fast, before any draw, when a bucket cannot fill its quota.
    /// Roles are checked in canonical order; the first short one is reported.
    pub fn ensure_quotas(&self, spec: &AllocationSpec) -> Result<(), AllocError> {
        for role in Role::ALL {
            let required = spec.quota(role);
            let available = self.catalog.bucket(role).len();
            if available < required as usize {
                return Err(AllocError::CatalogInsufficient { role, required, available });
            }
        }
        Ok(())
    }

    /// True when every view holds exactly its quota: the composition has no freedom.
    pub fn is_fixed(&self, spec: &AllocationSpec) -> bool {
        Role::ALL
            .iter()
            .all(|&r| self.view(r).len() == spec.quota(r) as usize)
    }
}
