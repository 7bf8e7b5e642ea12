//! Cheapest valid composition: the `quota(role)` lowest-priced candidates of each
//! full role bucket (price ↑, fantasy_rating ↓, appearances ↓).
//!
//! No RNG. Used as the last resort of paired generation and on explicit request.
//! The reported tolerance is whatever the composition actually satisfies.

use std::collections::BTreeMap;

use fe_core::determinism::sort_by_price_asc;
use fe_core::{AllocationMethod, AllocationResult, AllocationSpec, Catalog, Role, Roster, Tolerance};

use crate::allocator::evaluate;
use crate::index::PriorityIndex;
use crate::AllocError;

pub fn cheapest_composition(
    catalog: &Catalog,
    spec: &AllocationSpec,
) -> Result<AllocationResult, AllocError> {
    // The full bucket is considered, so the top-K bound is irrelevant here.
    PriorityIndex::build(catalog, spec, 0).ensure_quotas(spec)?;

    let mut slots = BTreeMap::new();
    for role in Role::ALL {
        let quota = spec.quota(role) as usize;
        if quota == 0 {
            continue;
        }
        let mut pool = catalog.bucket(role).to_vec();
        sort_by_price_asc(&mut pool);
        pool.truncate(quota);
        slots.insert(role, pool);
    }
    let roster = Roster::from_slots(slots);

    let eval = evaluate(&roster, spec);
    let (tolerance, penalty) = match eval.accepted() {
        Some(level) => (level, 0.0),
        None => (Tolerance::None, eval.penalty),
    };

    Ok(AllocationResult {
        roster,
        seed: spec.seed.clone(),
        satisfied_tolerance: tolerance,
        used_fallback: true,
        method: AllocationMethod::Cheapest,
        attempts: 0,
        penalty,
    })
}
