//! strategy.rs: allocation specs, share bands, tolerance levels, mode presets.
//!
//! A `StrategyMode` is the product-facing name ("equilibrata", …). It resolves
//! to an `AllocationSpec` with fixed quotas and share bands; the budget window
//! and seed come from the caller.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::roles::Role;

/// ------------ Defaults ------------

pub const DEFAULT_BUDGET_MIN: f64 = 0.0;
pub const DEFAULT_BUDGET_MAX: f64 = 1000.0;

/// Classic 25-man roster: 3 P, 8 D, 8 C, 6 A.
pub const DEFAULT_QUOTA: [(Role, u32); 4] = [(Role::P, 3), (Role::D, 8), (Role::C, 8), (Role::A, 6)];

/// ------------ Canonical enums (wire tokens explicit) ------------

token_enum!(
    /// Product strategy mode.
    StrategyMode => {
        Equilibrata = "equilibrata",
        Offensiva   = "offensiva",
        Difensiva   = "difensiva",
    }
);

token_enum!(
    /// How far the share bands had to be widened for a roster to qualify.
    Tolerance => {
        Strict      = "strict",
        Relaxed2pct = "relaxed_2pct",
        Relaxed5pct = "relaxed_5pct",
        /// No level passed (fallback roster).
        None        = "none",
    }
);

impl Tolerance {
    /// Escalation ladder, tried in order.
    pub const LEVELS: [Tolerance; 3] = [Tolerance::Strict, Tolerance::Relaxed2pct, Tolerance::Relaxed5pct];

    /// Band widening (fraction of total spend) applied on both sides.
    pub fn widening(self) -> Option<f64> {
        match self {
            Tolerance::Strict => Some(0.0),
            Tolerance::Relaxed2pct => Some(0.02),
            Tolerance::Relaxed5pct => Some(0.05),
            Tolerance::None => None,
        }
    }
}

/// ------------ Share band ------------

/// Acceptable fraction `[low, high]` of total spend for one role.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShareBand {
    pub low: f64,
    pub high: f64,
}

impl ShareBand {
    pub const UNBOUNDED: ShareBand = ShareBand { low: 0.0, high: 1.0 };

    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Membership with the band widened by `widen` on both sides.
    #[inline]
    pub fn contains(&self, share: f64, widen: f64) -> bool {
        share >= self.low - widen && share <= self.high + widen
    }

    /// Distance from `share` to the strict band (0 inside).
    #[inline]
    pub fn deviation(&self, share: f64) -> f64 {
        if share < self.low {
            self.low - share
        } else if share > self.high {
            share - self.high
        } else {
            0.0
        }
    }

    fn is_valid(&self) -> bool {
        self.low.is_finite()
            && self.high.is_finite()
            && self.low >= 0.0
            && self.high <= 1.0
            && self.low <= self.high
    }
}

/// ------------ Allocation spec ------------

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AllocationSpec {
    pub role_quota: BTreeMap<Role, u32>,
    pub budget_min: f64,
    pub budget_max: f64,
    pub role_share_bands: BTreeMap<Role, ShareBand>,
    /// Opaque; only ever hashed.
    pub seed: String,
}

impl AllocationSpec {
    /// Spec for a preset mode with the default budget window.
    pub fn for_mode(mode: StrategyMode, seed: impl Into<String>) -> Self {
        Self {
            role_quota: DEFAULT_QUOTA.iter().copied().collect(),
            budget_min: DEFAULT_BUDGET_MIN,
            budget_max: DEFAULT_BUDGET_MAX,
            role_share_bands: mode.bands(),
            seed: seed.into(),
        }
    }

    pub fn with_budget(mut self, budget_min: f64, budget_max: f64) -> Self {
        self.budget_min = budget_min;
        self.budget_max = budget_max;
        self
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Copy with the budget window widened by `amount` each side (lower bound floors at 0).
    pub fn widened_budget(&self, amount: f64) -> Self {
        let mut out = self.clone();
        out.budget_min = (self.budget_min - amount).max(0.0);
        out.budget_max = self.budget_max + amount;
        out
    }

    /// Required headcount for `role` (0 when absent).
    pub fn quota(&self, role: Role) -> u32 {
        self.role_quota.get(&role).copied().unwrap_or(0)
    }

    /// Share band for `role` (unbounded when absent).
    pub fn band(&self, role: Role) -> ShareBand {
        self.role_share_bands.get(&role).copied().unwrap_or(ShareBand::UNBOUNDED)
    }

    pub fn roster_size(&self) -> u32 {
        self.role_quota.values().sum()
    }

    /// Domain checks: finite ordered budget, bands inside [0,1], non-empty roster.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.budget_min.is_finite()
            || !self.budget_max.is_finite()
            || self.budget_min < 0.0
            || self.budget_min > self.budget_max
        {
            return Err(CoreError::InvalidBudget);
        }
        for (role, band) in &self.role_share_bands {
            if !band.is_valid() {
                return Err(CoreError::InvalidBand(role.as_str()));
            }
        }
        if self.roster_size() == 0 {
            return Err(CoreError::InvalidQuota("*"));
        }
        Ok(())
    }
}

/// ------------ Mode presets ------------

impl StrategyMode {
    /// Fixed per-mode share bands (fractions of total spend).
    pub fn bands(self) -> BTreeMap<Role, ShareBand> {
        let table: [(Role, ShareBand); 4] = match self {
            StrategyMode::Equilibrata => [
                (Role::P, ShareBand::new(0.05, 0.10)),
                (Role::D, ShareBand::new(0.15, 0.25)),
                (Role::C, ShareBand::new(0.20, 0.30)),
                (Role::A, ShareBand::new(0.40, 0.55)),
            ],
            StrategyMode::Offensiva => [
                (Role::P, ShareBand::new(0.03, 0.08)),
                (Role::D, ShareBand::new(0.10, 0.18)),
                (Role::C, ShareBand::new(0.15, 0.25)),
                (Role::A, ShareBand::new(0.55, 0.70)),
            ],
            StrategyMode::Difensiva => [
                (Role::P, ShareBand::new(0.08, 0.14)),
                (Role::D, ShareBand::new(0.22, 0.32)),
                (Role::C, ShareBand::new(0.22, 0.32)),
                (Role::A, ShareBand::new(0.28, 0.42)),
            ],
        };
        table.into_iter().collect()
    }
}

impl Default for StrategyMode {
    fn default() -> Self {
        StrategyMode::Equilibrata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate_and_sum_to_25() {
        for mode in StrategyMode::ALL {
            let spec = AllocationSpec::for_mode(*mode, "s");
            assert!(spec.validate().is_ok(), "{mode}");
            assert_eq!(spec.roster_size(), 25);
            let lows: f64 = spec.role_share_bands.values().map(|b| b.low).sum();
            let highs: f64 = spec.role_share_bands.values().map(|b| b.high).sum();
            assert!(lows <= 1.0 && highs >= 1.0, "{mode}: bands must admit a full split");
        }
    }

    #[test]
    fn mode_tokens_round_trip() {
        assert_eq!("Equilibrata".parse::<StrategyMode>().unwrap(), StrategyMode::Equilibrata);
        assert_eq!(StrategyMode::Offensiva.as_str(), "offensiva");
        assert_eq!("turbo".parse::<StrategyMode>(), Err(CoreError::UnknownToken));
    }

    #[test]
    fn band_membership_and_deviation() {
        let b = ShareBand::new(0.20, 0.30);
        assert!(b.contains(0.25, 0.0));
        assert!(!b.contains(0.31, 0.0));
        assert!(b.contains(0.31, 0.02));
        assert!(!b.contains(0.14, 0.05));
        assert_eq!(b.deviation(0.25), 0.0);
        assert!((b.deviation(0.10) - 0.10).abs() < 1e-12);
        assert!((b.deviation(0.35) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn tolerance_ladder() {
        assert_eq!(Tolerance::LEVELS[0], Tolerance::Strict);
        assert_eq!(Tolerance::Relaxed5pct.widening(), Some(0.05));
        assert_eq!(Tolerance::None.widening(), None);
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        let spec = AllocationSpec::for_mode(StrategyMode::Equilibrata, "s").with_budget(500.0, 400.0);
        assert_eq!(spec.validate(), Err(CoreError::InvalidBudget));

        let mut spec = AllocationSpec::for_mode(StrategyMode::Equilibrata, "s");
        spec.role_share_bands.insert(Role::C, ShareBand::new(0.4, 0.3));
        assert_eq!(spec.validate(), Err(CoreError::InvalidBand("C")));

        let mut spec = AllocationSpec::for_mode(StrategyMode::Equilibrata, "s");
        spec.role_quota.clear();
        assert_eq!(spec.validate(), Err(CoreError::InvalidQuota("*")));
    }

    #[test]
    fn widening_floors_at_zero() {
        let spec = AllocationSpec::for_mode(StrategyMode::Difensiva, "s").with_budget(30.0, 400.0);
        let w = spec.widened_budget(50.0);
        assert_eq!(w.budget_min, 0.0);
        assert_eq!(w.budget_max, 450.0);
        assert_eq!(w.seed, spec.seed);
    }
}
