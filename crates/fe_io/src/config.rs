//! Strategy configuration file: named strategies overriding or extending the
//! built-in presets. Validated against `schemas/strategies.schema.json` before
//! deserialization; unknown fields are rejected at both layers.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use fe_core::{Role, ShareBand, StrategyMode};

use crate::loader::read_json_value_with_limits;
use crate::schema::{validate_value, SchemaKind};
use crate::IoError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    pub strategies: BTreeMap<String, StrategyEntry>,
}

/// One named strategy. Absent fields inherit from `base` (or from the preset of
/// the same name, or `equilibrata`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyEntry {
    #[serde(default)]
    pub base: Option<StrategyMode>,
    #[serde(default)]
    pub quota: BTreeMap<Role, u32>,
    #[serde(default)]
    pub bands: BTreeMap<Role, ShareBand>,
    #[serde(default)]
    pub budget_min: Option<f64>,
    #[serde(default)]
    pub budget_max: Option<f64>,
}

impl StrategyConfig {
    pub fn get(&self, name: &str) -> Option<&StrategyEntry> {
        self.strategies.get(&name.trim().to_ascii_lowercase())
    }
}

/// Schema-check then deserialize an already parsed document.
pub fn parse_strategy_config(v: Value) -> Result<StrategyConfig, IoError> {
    validate_value(SchemaKind::Strategies, &v)?;
    let cfg: StrategyConfig = serde_json::from_value(v)?;
    for (name, entry) in &cfg.strategies {
        if let (Some(lo), Some(hi)) = (entry.budget_min, entry.budget_max) {
            if lo > hi {
                return Err(IoError::ConfigSchema {
                    pointer: format!("/strategies/{name}"),
                    msg: format!("budget_min {lo} exceeds budget_max {hi}"),
                });
            }
        }
        for (role, band) in &entry.bands {
            if band.low > band.high {
                return Err(IoError::ConfigSchema {
                    pointer: format!("/strategies/{name}/bands/{role}"),
                    msg: format!("low {} exceeds high {}", band.low, band.high),
                });
            }
        }
    }
    Ok(cfg)
}

pub fn load_strategy_config(path: &Path) -> Result<StrategyConfig, IoError> {
    let v = read_json_value_with_limits(path)?;
    parse_strategy_config(v)
}
