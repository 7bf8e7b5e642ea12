//! Candidates and the read-only catalog snapshot.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::determinism::sort_by_priority;
use crate::roles::Role;

/// One purchasable player, already canonical (role resolved, numbers parsed).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CandidateRecord {
    pub name: String,
    pub team: String,
    pub role: Role,
    /// Credits; finite and non-negative.
    pub price: f64,
    /// Average grade.
    pub rating: f64,
    pub fantasy_rating: f64,
    pub appearances: u32,
}

impl CandidateRecord {
    pub fn new(name: impl Into<String>, team: impl Into<String>, role: Role, price: f64) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
            role,
            price,
            rating: 0.0,
            fantasy_rating: 0.0,
            appearances: 0,
        }
    }

    pub fn with_stats(mut self, rating: f64, fantasy_rating: f64, appearances: u32) -> Self {
        self.rating = rating;
        self.fantasy_rating = fantasy_rating;
        self.appearances = appearances;
        self
    }

    /// Copy with a different price (price-list overrides).
    pub fn repriced(&self, price: f64) -> Self {
        Self { price, ..self.clone() }
    }
}

/// Immutable snapshot: role → candidates sorted by priority
/// (appearances ↓, fantasy_rating ↓, price ↓; stable for full ties).
///
/// Every role is present (possibly empty). There is no mutating API; a refresh
/// builds a new `Catalog`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Catalog {
    buckets: BTreeMap<Role, Vec<CandidateRecord>>,
}

impl Catalog {
    pub fn from_candidates<I: IntoIterator<Item = CandidateRecord>>(candidates: I) -> Self {
        let mut buckets: BTreeMap<Role, Vec<CandidateRecord>> =
            Role::ALL.iter().map(|r| (*r, Vec::new())).collect();
        for c in candidates {
            buckets.entry(c.role).or_default().push(c);
        }
        for bucket in buckets.values_mut() {
            sort_by_priority(bucket);
        }
        Self { buckets }
    }

    /// Priority-ordered bucket for `role` (empty slice if none).
    pub fn bucket(&self, role: Role) -> &[CandidateRecord] {
        self.buckets.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn role_counts(&self) -> BTreeMap<Role, usize> {
        self.buckets.iter().map(|(r, b)| (*r, b.len())).collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All candidates, role-major in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &CandidateRecord> {
        self.buckets.values().flat_map(|b| b.iter())
    }
}
