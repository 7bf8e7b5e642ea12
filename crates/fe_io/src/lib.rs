//! crates/fe_io/src/lib.rs
//! Single-source-of-truth I/O crate for the roster engine.
//!
//! - Shared error type (`IoError`) with `From` conversions used across modules.
//! - Catalog normalization lives in `normalize`; file access in `loader`.
//! - Details live in submodules; this file only wires them together.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Mandatory catalog fields that could not be mapped to any column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unresolved mandatory columns: {}", .missing.join(", "))]
pub struct SchemaError {
    pub missing: Vec<&'static str>,
}

/// Unified error for fe_io (loader/normalize/schema/canonical_json/hasher).
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem read failures.
    #[error("read error: {0}")]
    Read(String),

    /// Malformed CSV input.
    #[error("csv error: {0}")]
    Csv(String),

    /// JSON serialization/deserialization errors with a JSON Pointer.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Catalog header resolution failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Config or price list rejected by its JSON Schema.
    #[error("config schema violation at {pointer}: {msg}")]
    ConfigSchema { pointer: String, msg: String },

    /// Input exceeded a size bound.
    #[error("input too large: {0}")]
    Limit(String),

    /// Path policy or write failures (URLs, missing parent, rename, fsync).
    #[error("io/path error: {0}")]
    Path(String),
}

pub type IoResult<T> = Result<T, IoError>;

/* ---------------- From conversions (used by file modules) ---------------- */

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps line/column, not a pointer; default to root.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        IoError::Csv(e.to_string())
    }
}

/* ---------------- Public modules ---------------- */

pub mod canonical_json;
pub mod config;
pub mod hasher;
pub mod loader;
pub mod normalize;
pub mod schema;

/// Returns true if `s` looks like a URL (any `<scheme>://`, including `file://`).
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    s.trim().contains("://")
}

pub mod prelude {
    pub use crate::{looks_like_url_strict, IoError, IoResult, SchemaError};

    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file};
    pub use crate::config::{load_strategy_config, StrategyConfig, StrategyEntry};
    pub use crate::hasher::{content_id, sha256_canonical, sha256_hex};
    pub use crate::loader::{load_price_list, load_raw_table};
    pub use crate::normalize::{normalize, HeaderSynonyms, NormalizedCatalog, RawCell, RawTable};
}
