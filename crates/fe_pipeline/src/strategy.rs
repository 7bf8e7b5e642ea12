//! Strategy resolution: mode name (+ optional config file) → `AllocationSpec`.
//!
//! Precedence, lowest to highest: built-in preset, config entry, request budget.
//! A config entry named after a preset inherits that preset; otherwise it
//! inherits its `base` (default `equilibrata`).

use fe_core::{AllocationSpec, StrategyMode};
use fe_io::config::StrategyConfig;

use crate::PipelineError;

/// Budget bounds supplied by the request; `None` keeps the resolved default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BudgetOverride {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Resolve `mode` to a validated spec carrying `seed`. Returns the canonical mode name.
pub fn resolve_spec(
    mode: &str,
    config: Option<&StrategyConfig>,
    budget: BudgetOverride,
    seed: &str,
) -> Result<(String, AllocationSpec), PipelineError> {
    let name = mode.trim().to_ascii_lowercase();
    let preset = name.parse::<StrategyMode>().ok();

    let mut spec = match config.and_then(|c| c.get(&name)) {
        Some(entry) => {
            let base = entry.base.or(preset).unwrap_or_default();
            let mut spec = AllocationSpec::for_mode(base, seed);
            for (role, n) in &entry.quota {
                spec.role_quota.insert(*role, *n);
            }
            for (role, band) in &entry.bands {
                spec.role_share_bands.insert(*role, *band);
            }
            if let Some(lo) = entry.budget_min {
                spec.budget_min = lo;
            }
            if let Some(hi) = entry.budget_max {
                spec.budget_max = hi;
            }
            spec
        }
        None => match preset {
            Some(m) => AllocationSpec::for_mode(m, seed),
            None => {
                return Err(PipelineError::Config(format!("unknown strategy mode {name:?}")));
            }
        },
    };

    if let Some(lo) = budget.min {
        spec.budget_min = lo;
    }
    if let Some(hi) = budget.max {
        spec.budget_max = hi;
    }
    spec.validate()?;
    Ok((name, spec))
}
