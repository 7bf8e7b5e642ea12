//! Determinism utilities: stable candidate orderings.
//!
//! This module is **I/O-free**. It provides:
//! - The catalog priority order (appearances ↓, fantasy_rating ↓, price ↓)
//! - The cheapest-composition order (price ↑, fantasy_rating ↓, appearances ↓)
//! - Canonical in-place sort helpers (always stable; equal keys keep input order)
//!
//! Float keys compare with `f64::total_cmp`, so the orders are total even if a
//! non-finite value slips past the normalizer.

use core::cmp::Ordering;

use crate::entities::CandidateRecord;

/* -------------------------------------------------------------------------- */
/*                               Stable Ordering                              */
/* -------------------------------------------------------------------------- */

/// Provide a **total**, stable order for values that must sort canonically.
pub trait StableOrd {
    fn stable_cmp(&self, other: &Self) -> Ordering;
}

impl StableOrd for CandidateRecord {
    /// Canonical catalog order is **always** the priority order.
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        cmp_priority(self, other)
    }
}

/// Priority: appearances ↓, then fantasy_rating ↓, then price ↓.
#[inline]
pub fn cmp_priority(a: &CandidateRecord, b: &CandidateRecord) -> Ordering {
    b.appearances
        .cmp(&a.appearances)
        .then_with(|| b.fantasy_rating.total_cmp(&a.fantasy_rating))
        .then_with(|| b.price.total_cmp(&a.price))
}

/// Cheapest-first: price ↑, then fantasy_rating ↓, then appearances ↓.
#[inline]
pub fn cmp_cheapest(a: &CandidateRecord, b: &CandidateRecord) -> Ordering {
    a.price
        .total_cmp(&b.price)
        .then_with(|| b.fantasy_rating.total_cmp(&a.fantasy_rating))
        .then_with(|| b.appearances.cmp(&a.appearances))
}

/* -------------------------------------------------------------------------- */
/*                            Canonical sort helpers                           */
/* -------------------------------------------------------------------------- */

#[inline]
pub fn sort_by_priority(xs: &mut [CandidateRecord]) {
    xs.sort_by(|a, b| a.stable_cmp(b));
}

#[inline]
pub fn sort_by_price_asc(xs: &mut [CandidateRecord]) {
    xs.sort_by(cmp_cheapest);
}

/* ---------------------------------- Tests --------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;

    fn cand(name: &str, price: f64, fm: f64, apps: u32) -> CandidateRecord {
        CandidateRecord::new(name, "", Role::C, price).with_stats(6.0, fm, apps)
    }

    #[test]
    fn priority_keys_in_order() {
        let mut xs = vec![
            cand("cheap", 1.0, 6.0, 10),
            cand("pricey", 9.0, 6.0, 10),
            cand("better_fm", 1.0, 7.0, 10),
            cand("most_apps", 1.0, 5.0, 30),
        ];
        sort_by_priority(&mut xs);
        let got: Vec<&str> = xs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(got, vec!["most_apps", "better_fm", "pricey", "cheap"]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let mut xs = vec![cand("first", 1.0, 6.0, 1), cand("second", 1.0, 6.0, 1)];
        sort_by_priority(&mut xs);
        assert_eq!(xs[0].name, "first");
    }

    #[test]
    fn cheapest_keys_in_order() {
        let mut xs = vec![
            cand("b", 2.0, 6.0, 1),
            cand("a_low_fm", 1.0, 5.0, 9),
            cand("a_high_fm", 1.0, 6.5, 1),
            cand("a_high_fm_more_apps", 1.0, 6.5, 4),
        ];
        sort_by_price_asc(&mut xs);
        let got: Vec<&str> = xs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(got, vec!["a_high_fm_more_apps", "a_high_fm", "a_low_fm", "b"]);
    }
}
