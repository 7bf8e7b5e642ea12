//! Paired generation: two rosters that share at most `1 − min_distinct` of their slots.
//!
//! Roster A is allocated once from `spec_a`. Roster B is searched in three stages:
//! 1. up to `max_tries` derived seeds (`derive_seed(spec_b.seed, n)`, n = 1..);
//! 2. the same search with B's budget widened by `budget_widening` each side;
//! 3. the cheapest composition under the original `spec_b`.
//!
//! A miss never fails the call; `diversity_satisfied` reports the actual outcome.

use fe_core::rng::derive_seed;
use fe_core::{AllocationResult, AllocationSpec, Catalog};

use crate::allocator::{allocate_with, AllocatorConfig, MAX_TRIES};
use crate::cheapest::cheapest_composition;
use crate::AllocError;

/// Float slack on the overlap comparison (0.4 · 25 is not exact in binary).
const OVERLAP_EPS: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairConfig {
    /// Derived seeds tried per stage.
    pub max_tries: u32,
    /// Credits added to each side of B's budget window in the second stage.
    pub budget_widening: f64,
    pub allocator: AllocatorConfig,
}

impl Default for PairConfig {
    fn default() -> Self {
        Self { max_tries: MAX_TRIES, budget_widening: 50.0, allocator: AllocatorConfig::default() }
    }
}

/// Which stage produced roster B.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PairStage {
    Seeded,
    WidenedBudget,
    CheapestFallback,
}

impl PairStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairStage::Seeded => "seeded",
            PairStage::WidenedBudget => "widened_budget",
            PairStage::CheapestFallback => "cheapest_fallback",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PairResult {
    pub first: AllocationResult,
    pub second: AllocationResult,
    /// Number of B slots whose name also appears in A.
    pub overlap: usize,
    /// `overlap / |B|` (0 for an empty roster).
    pub overlap_fraction: f64,
    pub diversity_satisfied: bool,
    pub stage: PairStage,
}

pub fn allocate_pair(
    catalog: &Catalog,
    spec_a: &AllocationSpec,
    spec_b: &AllocationSpec,
    min_distinct_fraction: f64,
) -> Result<PairResult, AllocError> {
    allocate_pair_with(catalog, spec_a, spec_b, min_distinct_fraction, &PairConfig::default())
}

pub fn allocate_pair_with(
    catalog: &Catalog,
    spec_a: &AllocationSpec,
    spec_b: &AllocationSpec,
    min_distinct_fraction: f64,
    cfg: &PairConfig,
) -> Result<PairResult, AllocError> {
    let min_distinct = if min_distinct_fraction.is_nan() {
        0.0
    } else {
        min_distinct_fraction.clamp(0.0, 1.0)
    };
    let max_overlap = 1.0 - min_distinct;

    let first = allocate_with(catalog, spec_a, &cfg.allocator)?;

    if let Some(second) = search_second(catalog, spec_b, &first, max_overlap, cfg)? {
        return Ok(pair(first, second, max_overlap, PairStage::Seeded));
    }

    let widened = spec_b.widened_budget(cfg.budget_widening);
    log::debug!(
        "diversity: no distinct roster in {} seeds; widening budget to {}..{}",
        cfg.max_tries,
        widened.budget_min,
        widened.budget_max
    );
    if let Some(second) = search_second(catalog, &widened, &first, max_overlap, cfg)? {
        return Ok(pair(first, second, max_overlap, PairStage::WidenedBudget));
    }

    let second = cheapest_composition(catalog, spec_b)?;
    let out = pair(first, second, max_overlap, PairStage::CheapestFallback);
    if !out.diversity_satisfied {
        log::warn!(
            "diversity: cheapest fallback still shares {} of {} slots (allowed fraction {:.3})",
            out.overlap,
            out.second.roster.len(),
            max_overlap
        );
    }
    Ok(out)
}

fn search_second(
    catalog: &Catalog,
    spec_b: &AllocationSpec,
    first: &AllocationResult,
    max_overlap: f64,
    cfg: &PairConfig,
) -> Result<Option<AllocationResult>, AllocError> {
    for attempt in 1..=cfg.max_tries {
        let spec = spec_b.clone().with_seed(derive_seed(&spec_b.seed, attempt));
        let candidate = allocate_with(catalog, &spec, &cfg.allocator)?;
        let overlap = candidate.roster.overlap_with(&first.roster);
        if overlap_fraction(overlap, candidate.roster.len()) <= max_overlap + OVERLAP_EPS {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

fn overlap_fraction(overlap: usize, size: usize) -> f64 {
    if size == 0 {
        0.0
    } else {
        overlap as f64 / size as f64
    }
}

fn pair(first: AllocationResult, second: AllocationResult, max_overlap: f64, stage: PairStage) -> PairResult {
    let overlap = second.roster.overlap_with(&first.roster);
    let fraction = overlap_fraction(overlap, second.roster.len());
    PairResult {
        diversity_satisfied: fraction <= max_overlap + OVERLAP_EPS,
        overlap,
        overlap_fraction: fraction,
        stage,
        first,
        second,
    }
}
