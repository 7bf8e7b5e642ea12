//! Allocation outputs: `Roster` (slots + derived totals) and `AllocationResult`.

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::entities::CandidateRecord;
use crate::roles::Role;
use crate::strategy::Tolerance;

token_enum!(
    /// Which path of the allocator produced a result.
    AllocationMethod => {
        /// Sampled roster accepted at some tolerance level.
        Sampled         = "sampled",
        /// Lowest-penalty sampled roster after the search was exhausted.
        PenaltyFallback = "penalty_fallback",
        /// Deterministic cheapest-valid composition.
        Cheapest        = "cheapest",
    }
);

/// Role → ordered slots, with `total` and `role_share` derived once at construction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Roster {
    slots: BTreeMap<Role, Vec<CandidateRecord>>,
    total: f64,
    role_share: BTreeMap<Role, f64>,
}

impl Roster {
    pub fn from_slots(slots: BTreeMap<Role, Vec<CandidateRecord>>) -> Self {
        let total: f64 = slots.values().flat_map(|v| v.iter()).map(|c| c.price).sum();
        let role_share = slots
            .iter()
            .map(|(role, picks)| {
                let spend: f64 = picks.iter().map(|c| c.price).sum();
                let share = if total > 0.0 { spend / total } else { 0.0 };
                (*role, share)
            })
            .collect();
        Self { slots, total, role_share }
    }

    pub fn slots(&self) -> &BTreeMap<Role, Vec<CandidateRecord>> {
        &self.slots
    }

    pub fn role(&self, role: Role) -> &[CandidateRecord] {
        self.slots.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sum of slot prices.
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn role_share(&self) -> &BTreeMap<Role, f64> {
        &self.role_share
    }

    /// Fraction of total spent on `role` (0 when absent or total is 0).
    pub fn share(&self, role: Role) -> f64 {
        self.role_share.get(&role).copied().unwrap_or(0.0)
    }

    /// Credits spent per role.
    pub fn role_spend(&self) -> BTreeMap<Role, f64> {
        self.slots
            .iter()
            .map(|(r, picks)| (*r, picks.iter().map(|c| c.price).sum()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All slots, role-major in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &CandidateRecord> {
        self.slots.values().flat_map(|v| v.iter())
    }

    pub fn names(&self) -> BTreeSet<&str> {
        self.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of slots in `self` whose name also appears in `other`.
    pub fn overlap_with(&self, other: &Roster) -> usize {
        let theirs = other.names();
        self.iter().filter(|c| theirs.contains(c.name.as_str())).count()
    }
}

/// One allocation outcome plus diagnostics describing how much was relaxed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AllocationResult {
    pub roster: Roster,
    pub seed: String,
    pub satisfied_tolerance: Tolerance,
    pub used_fallback: bool,
    pub method: AllocationMethod,
    /// Search iterations consumed (0 for the cheapest composition).
    pub attempts: u32,
    /// Penalty score of the returned roster (0 when accepted).
    pub penalty: f64,
}
