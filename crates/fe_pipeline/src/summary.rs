//! Budget summary and price-list handling for finished rosters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fe_core::{AllocationSpec, CandidateRecord, Role, Roster};

/// Half-up to one decimal (percent display).
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Spend breakdown of one roster against its requested budget window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub counts: BTreeMap<Role, usize>,
    pub spend: BTreeMap<Role, f64>,
    /// Percent of total per role, one decimal; all 0 when total is 0.
    pub percent: BTreeMap<Role, f64>,
    pub total: f64,
    pub budget_min: f64,
    pub budget_max: f64,
    pub within_range: bool,
    /// `total − budget_min`
    pub diff_from_min: f64,
    /// `budget_max − total`
    pub diff_from_max: f64,
}

impl BudgetSummary {
    pub fn of(roster: &Roster, spec: &AllocationSpec) -> Self {
        let total = roster.total();
        let spend = roster.role_spend();
        let counts = Role::ALL
            .iter()
            .map(|&r| (r, roster.role(r).len()))
            .collect();
        let percent = Role::ALL
            .iter()
            .map(|&r| {
                let s = spend.get(&r).copied().unwrap_or(0.0);
                (r, if total > 0.0 { round1(s * 100.0 / total) } else { 0.0 })
            })
            .collect();
        let spend = Role::ALL
            .iter()
            .map(|&r| (r, spend.get(&r).copied().unwrap_or(0.0)))
            .collect();
        Self {
            counts,
            spend,
            percent,
            total,
            budget_min: spec.budget_min,
            budget_max: spec.budget_max,
            within_range: total >= spec.budget_min && total <= spec.budget_max,
            diff_from_min: total - spec.budget_min,
            diff_from_max: spec.budget_max - total,
        }
    }
}

/// Roster member with no entry in the supplied price list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingPrice {
    pub role: Role,
    pub name: String,
    pub team: String,
}

/// Replace catalog prices with list prices where the name matches exactly.
/// Returns the number of repriced candidates.
pub fn apply_price_list(candidates: &mut [CandidateRecord], list: &BTreeMap<String, f64>) -> usize {
    let mut hits = 0;
    for c in candidates.iter_mut() {
        if let Some(&p) = list.get(c.name.trim()) {
            *c = c.repriced(p);
            hits += 1;
        }
    }
    hits
}

/// Roster members absent from `list`, in roster order.
pub fn missing_prices(roster: &Roster, list: &BTreeMap<String, f64>) -> Vec<MissingPrice> {
    roster
        .iter()
        .filter(|c| !list.contains_key(c.name.trim()))
        .map(|c| MissingPrice { role: c.role, name: c.name.clone(), team: c.team.clone() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fe_core::StrategyMode;

    fn roster() -> Roster {
        let mut slots = BTreeMap::new();
        slots.insert(Role::P, vec![CandidateRecord::new("Musso", "Atalanta", Role::P, 12.0)]);
        slots.insert(
            Role::D,
            vec![
                CandidateRecord::new("Dorgu", "Lecce", Role::D, 13.0),
                CandidateRecord::new("Azzi", "Cagliari", Role::D, 5.0),
            ],
        );
        slots.insert(Role::A, vec![CandidateRecord::new("Morata", "Milan", Role::A, 60.0)]);
        Roster::from_slots(slots)
    }

    #[test]
    fn summary_matches_roster() {
        let spec = AllocationSpec::for_mode(StrategyMode::Equilibrata, "s").with_budget(80.0, 100.0);
        let s = BudgetSummary::of(&roster(), &spec);
        assert_eq!(s.total, 90.0);
        assert_eq!(s.counts[&Role::D], 2);
        assert_eq!(s.counts[&Role::C], 0);
        assert_eq!(s.spend[&Role::D], 18.0);
        assert_eq!(s.spend[&Role::C], 0.0);
        assert_eq!(s.percent[&Role::P], 13.3);
        assert_eq!(s.percent[&Role::A], 66.7);
        assert!(s.within_range);
        assert_eq!(s.diff_from_min, 10.0);
        assert_eq!(s.diff_from_max, 10.0);
    }

    #[test]
    fn out_of_range_reports_signed_diffs() {
        let spec = AllocationSpec::for_mode(StrategyMode::Equilibrata, "s").with_budget(100.0, 200.0);
        let s = BudgetSummary::of(&roster(), &spec);
        assert!(!s.within_range);
        assert_eq!(s.diff_from_min, -10.0);
        assert_eq!(s.diff_from_max, 110.0);
    }

    #[test]
    fn price_list_reprices_and_reports_gaps() {
        let list: BTreeMap<String, f64> = [("Musso".to_string(), 15.0), ("Morata".to_string(), 55.0)].into();
        let mut cands = vec![
            CandidateRecord::new("Musso", "Atalanta", Role::P, 12.0),
            CandidateRecord::new("Azzi", "Cagliari", Role::D, 5.0),
        ];
        assert_eq!(apply_price_list(&mut cands, &list), 1);
        assert_eq!(cands[0].price, 15.0);
        assert_eq!(cands[1].price, 5.0);

        let gaps = missing_prices(&roster(), &list);
        let names: Vec<_> = gaps.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Dorgu", "Azzi"]);
        assert_eq!(gaps[0].team, "Lecce");
        assert_eq!(gaps[0].role, Role::D);
    }

    #[test]
    fn rounding_is_one_decimal() {
        assert_eq!(round1(18.149), 18.1);
        assert_eq!(round1(56.25), 56.3);
        assert_eq!(round1(0.0), 0.0);
    }
}
