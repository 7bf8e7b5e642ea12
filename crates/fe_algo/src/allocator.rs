//! Constrained roster allocation by seeded sampling.
//!
//! Contract:
//! - Quotas are hard: every returned roster has exactly `quota(role)` picks per role,
//!   no duplicates within a role. A bucket smaller than its quota fails up front.
//! - Budget window and share bands are soft. Each sampled roster is checked against
//!   the budget, then against the bands at widening 0 / 0.02 / 0.05 (first pass wins).
//! - Search is bounded by `max_tries`. When nothing qualifies, the lowest-penalty
//!   roster seen is returned (ties keep the earlier one) with `used_fallback = true`.
//! - A fully fixed composition (every view equals its quota) runs a single iteration.
//!
//! Determinism:
//! - One `SeedRng` per call, keyed by `spec.seed`. Draw order is P, D, C, A; each
//!   pick is a uniform index into the shrinking pool of that role's top-K view.

use std::collections::BTreeMap;

use fe_core::rng::SeedRng;
use fe_core::{
    AllocationMethod, AllocationResult, AllocationSpec, Catalog, CandidateRecord, Role, Roster,
    Tolerance,
};

use crate::index::{PriorityIndex, TOP_K};
use crate::AllocError;

/// Default search bound per allocation.
pub const MAX_TRIES: u32 = 500;

/// Penalty weights: budget miss, strict-band miss, distance from band floors.
const W_BUDGET: f64 = 10.0;
const W_BAND: f64 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocatorConfig {
    pub max_tries: u32,
    pub top_k: usize,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self { max_tries: MAX_TRIES, top_k: TOP_K }
    }
}

/// Soft-constraint verdict for one roster under one spec.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub within_budget: bool,
    /// First tolerance level whose widened bands all pass (`None` if none does).
    pub tolerance: Tolerance,
    pub penalty: f64,
}

impl Evaluation {
    /// Accepted iff the budget holds and some tolerance level passed.
    pub fn accepted(&self) -> Option<Tolerance> {
        (self.within_budget && self.tolerance != Tolerance::None).then_some(self.tolerance)
    }
}

/// Allocate with default search bounds.
pub fn allocate(catalog: &Catalog, spec: &AllocationSpec) -> Result<AllocationResult, AllocError> {
    allocate_with(catalog, spec, &AllocatorConfig::default())
}

pub fn allocate_with(
    catalog: &Catalog,
    spec: &AllocationSpec,
    cfg: &AllocatorConfig,
) -> Result<AllocationResult, AllocError> {
    let index = PriorityIndex::build(catalog, spec, cfg.top_k);
    index.ensure_quotas(spec)?;

    let tries = if index.is_fixed(spec) { 1 } else { cfg.max_tries.max(1) };
    let mut rng = SeedRng::from_seed_str(&spec.seed);

    let mut best = draw_roster(&index, spec, &mut rng);
    let mut best_eval = evaluate(&best, spec);
    if let Some(level) = best_eval.accepted() {
        return Ok(accepted(best, spec, level, 1));
    }

    for attempt in 2..=tries {
        let roster = draw_roster(&index, spec, &mut rng);
        let eval = evaluate(&roster, spec);
        if let Some(level) = eval.accepted() {
            return Ok(accepted(roster, spec, level, attempt));
        }
        // strictly lower only: the earliest of equal penalties stays
        if eval.penalty < best_eval.penalty {
            best = roster;
            best_eval = eval;
        }
    }

    log::debug!(
        "allocator: no roster qualified in {tries} tries (seed {:?}); penalty fallback {:.4}",
        spec.seed,
        best_eval.penalty
    );

    Ok(AllocationResult {
        roster: best,
        seed: spec.seed.clone(),
        satisfied_tolerance: Tolerance::None,
        used_fallback: true,
        method: AllocationMethod::PenaltyFallback,
        attempts: tries,
        penalty: best_eval.penalty,
    })
}

/// Score `roster` against the budget window and share bands of `spec`.
pub fn evaluate(roster: &Roster, spec: &AllocationSpec) -> Evaluation {
    let total = roster.total();
    let within_budget = total >= spec.budget_min && total <= spec.budget_max;

    let tolerance = Tolerance::LEVELS
        .iter()
        .copied()
        .find(|level| {
            let widen = level.widening().unwrap_or(0.0);
            Role::ALL
                .iter()
                .all(|&r| spec.band(r).contains(roster.share(r), widen))
        })
        .unwrap_or(Tolerance::None);

    Evaluation { within_budget, tolerance, penalty: penalty(roster, spec) }
}

/// `10·budget_dev + 1000·Σ strict-band deviation + Σ |share − low|`.
fn penalty(roster: &Roster, spec: &AllocationSpec) -> f64 {
    let total = roster.total();
    let budget_dev = if total < spec.budget_min {
        spec.budget_min - total
    } else if total > spec.budget_max {
        total - spec.budget_max
    } else {
        0.0
    };

    let mut band_dev = 0.0;
    let mut floor_dist = 0.0;
    for role in Role::ALL {
        let band = spec.band(role);
        let share = roster.share(role);
        band_dev += band.deviation(share);
        floor_dist += (share - band.low).abs();
    }

    W_BUDGET * budget_dev + W_BAND * band_dev + floor_dist
}

/// One sampled roster: per role, `quota` uniform picks without replacement.
fn draw_roster(index: &PriorityIndex<'_>, spec: &AllocationSpec, rng: &mut SeedRng) -> Roster {
    let mut slots: BTreeMap<Role, Vec<CandidateRecord>> = BTreeMap::new();
    for role in Role::ALL {
        let quota = spec.quota(role) as usize;
        if quota == 0 {
            continue;
        }
        let mut pool: Vec<&CandidateRecord> = index.view(role).iter().collect();
        let mut picks = Vec::with_capacity(quota);
        while picks.len() < quota {
            // quotas were checked against the view, so the pool never runs dry here
            let Some(ix) = rng.choose_index(pool.len()) else { break };
            picks.push(pool.remove(ix).clone());
        }
        slots.insert(role, picks);
    }
    Roster::from_slots(slots)
}

fn accepted(roster: Roster, spec: &AllocationSpec, level: Tolerance, attempts: u32) -> AllocationResult {
    AllocationResult {
        roster,
        seed: spec.seed.clone(),
        satisfied_tolerance: level,
        used_fallback: false,
        method: AllocationMethod::Sampled,
        attempts,
        penalty: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fe_core::{ShareBand, StrategyMode};

    /// 30 candidates per role; role prices scaled so any roster lands near the
    /// Equilibrata split (P ≈ 7%, D ≈ 20%, C ≈ 25%, A ≈ 48%).
    fn balanced_catalog() -> Catalog {
        let base = [(Role::P, 5.0), (Role::D, 5.0), (Role::C, 6.0), (Role::A, 16.0)];
        let mut v = Vec::new();
        for (role, price) in base {
            for i in 0..30u32 {
                let jitter = (i % 3) as f64 * 0.1;
                v.push(
                    CandidateRecord::new(format!("{role}-{i}"), "T", role, price + jitter)
                        .with_stats(6.0, 6.0 + (i % 5) as f64 * 0.1, 30 - i),
                );
            }
        }
        Catalog::from_candidates(v)
    }

    #[test]
    fn respects_quotas_and_budget() {
        let cat = balanced_catalog();
        let spec = AllocationSpec::for_mode(StrategyMode::Equilibrata, "alpha").with_budget(0.0, 500.0);
        let res = allocate(&cat, &spec).unwrap();
        for role in Role::ALL {
            assert_eq!(res.roster.role(role).len(), spec.quota(role) as usize);
        }
        assert!(res.roster.total() <= 500.0);
        assert!(!res.used_fallback);
        assert_eq!(res.method, AllocationMethod::Sampled);
        assert_ne!(res.satisfied_tolerance, Tolerance::None);
        assert_eq!(res.seed, "alpha");
    }

    #[test]
    fn same_seed_same_roster() {
        let cat = balanced_catalog();
        let spec = AllocationSpec::for_mode(StrategyMode::Equilibrata, "repeat");
        let a = allocate(&cat, &spec).unwrap();
        let b = allocate(&cat, &spec).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn no_duplicates_within_role() {
        let cat = balanced_catalog();
        let spec = AllocationSpec::for_mode(StrategyMode::Offensiva, "dupes");
        let res = allocate(&cat, &spec).unwrap();
        for role in Role::ALL {
            let mut names: Vec<_> = res.roster.role(role).iter().map(|c| &c.name).collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), spec.quota(role) as usize);
        }
    }

    #[test]
    fn infeasible_budget_falls_back_with_penalty() {
        let cat = balanced_catalog();
        let spec = AllocationSpec::for_mode(StrategyMode::Equilibrata, "tight").with_budget(0.0, 10.0);
        let cfg = AllocatorConfig { max_tries: 40, ..AllocatorConfig::default() };
        let res = allocate_with(&cat, &spec, &cfg).unwrap();
        assert!(res.used_fallback);
        assert_eq!(res.method, AllocationMethod::PenaltyFallback);
        assert_eq!(res.satisfied_tolerance, Tolerance::None);
        assert_eq!(res.attempts, 40);
        assert!(res.penalty > 0.0);
        assert_eq!(res.roster.len(), 25);
    }

    #[test]
    fn fixed_composition_runs_once() {
        let mut v = Vec::new();
        for (role, n) in [(Role::P, 3), (Role::D, 8), (Role::C, 8), (Role::A, 6)] {
            for i in 0..n {
                v.push(CandidateRecord::new(format!("{role}{i}"), "T", role, 1.0));
            }
        }
        let cat = Catalog::from_candidates(v);
        let mut spec = AllocationSpec::for_mode(StrategyMode::Equilibrata, "fixed");
        for role in Role::ALL {
            spec.role_share_bands.insert(role, ShareBand::UNBOUNDED);
        }
        let res = allocate(&cat, &spec).unwrap();
        assert_eq!(res.attempts, 1);
        assert_eq!(res.satisfied_tolerance, Tolerance::Strict);
        assert_eq!(res.roster.total(), 25.0);
    }

    #[test]
    fn short_bucket_is_an_error() {
        let v: Vec<_> = (0..5)
            .map(|i| CandidateRecord::new(format!("P{i}"), "T", Role::P, 1.0))
            .collect();
        let cat = Catalog::from_candidates(v);
        let spec = AllocationSpec::for_mode(StrategyMode::Equilibrata, "s");
        let err = allocate(&cat, &spec).unwrap_err();
        assert_eq!(err, AllocError::CatalogInsufficient { role: Role::D, required: 8, available: 0 });
    }

    #[test]
    fn evaluation_picks_first_passing_level() {
        let mut slots = BTreeMap::new();
        slots.insert(Role::P, vec![CandidateRecord::new("p", "T", Role::P, 11.0)]);
        slots.insert(Role::A, vec![CandidateRecord::new("a", "T", Role::A, 89.0)]);
        let roster = Roster::from_slots(slots);
        let mut spec = AllocationSpec::for_mode(StrategyMode::Equilibrata, "s");
        spec.role_share_bands.clear();
        spec.role_share_bands.insert(Role::P, ShareBand::new(0.0, 0.10));
        // P share 0.11: misses strict, passes at +0.02
        let eval = evaluate(&roster, &spec);
        assert!(eval.within_budget);
        assert_eq!(eval.tolerance, Tolerance::Relaxed2pct);
        assert_eq!(eval.accepted(), Some(Tolerance::Relaxed2pct));
        assert!((eval.penalty - (1000.0 * 0.01 + 0.11 + 0.89)).abs() < 1e-9);
    }

    #[test]
    fn budget_miss_blocks_acceptance() {
        let mut slots = BTreeMap::new();
        slots.insert(Role::A, vec![CandidateRecord::new("a", "T", Role::A, 120.0)]);
        let roster = Roster::from_slots(slots);
        let mut spec = AllocationSpec::for_mode(StrategyMode::Equilibrata, "s").with_budget(0.0, 100.0);
        spec.role_share_bands.clear();
        let eval = evaluate(&roster, &spec);
        assert!(!eval.within_budget);
        assert_eq!(eval.tolerance, Tolerance::Strict);
        assert_eq!(eval.accepted(), None);
        // 10·20 + Σ|share − 0| over roles (A share 1.0)
        assert!((eval.penalty - 201.0).abs() < 1e-9);
    }
}
