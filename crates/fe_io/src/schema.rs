//! Embedded JSON Schemas and validation of config inputs.
//!
//! Schemas are compiled from `schemas/*.schema.json` at call time; validation is
//! offline (local `$ref`s only). The first violation is reported with its
//! instance pointer.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

use crate::IoError;

const STRATEGIES_SCHEMA_JSON: &str = include_str!("../schemas/strategies.schema.json");
const PRICE_LIST_SCHEMA_JSON: &str = include_str!("../schemas/price_list.schema.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Strategies,
    PriceList,
}

impl SchemaKind {
    fn source(self) -> &'static str {
        match self {
            SchemaKind::Strategies => STRATEGIES_SCHEMA_JSON,
            SchemaKind::PriceList => PRICE_LIST_SCHEMA_JSON,
        }
    }
}

/// Validate `v` against the embedded schema for `kind`.
pub fn validate_value(kind: SchemaKind, v: &Value) -> Result<(), IoError> {
    let schema_v: Value = serde_json::from_str(kind.source()).map_err(|e| IoError::ConfigSchema {
        pointer: "/".into(),
        msg: format!("invalid embedded schema: {e}"),
    })?;
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema_v)
        .map_err(|e| IoError::ConfigSchema {
            pointer: "/".into(),
            msg: format!("schema compile error: {e}"),
        })?;

    if let Err(mut errors) = compiled.validate(v) {
        if let Some(err) = errors.next() {
            let ptr = err.instance_path.to_string();
            return Err(IoError::ConfigSchema {
                pointer: if ptr.is_empty() { "/".into() } else { ptr },
                msg: err.to_string(),
            });
        }
    }
    Ok(())
}
