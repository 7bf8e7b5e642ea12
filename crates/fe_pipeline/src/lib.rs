//! fe_pipeline: orchestration surface (load → normalize → snapshot → resolve strategy →
//! allocate → summarize → build documents).
//! File access, JSON shape and hashing are delegated to `fe_io`; search to `fe_algo`.

use std::fmt;

use fe_algo::AllocError;
use fe_core::CoreError;
use fe_io::IoError;

pub mod docs;
pub mod generate;
pub mod store;
pub mod strategy;
pub mod summary;

pub use docs::{PairDoc, RosterDoc};
pub use generate::{GenerateRequest, Generator, PairRequest};
pub use store::{CatalogReport, CatalogSnapshot, CatalogStore};
pub use strategy::resolve_spec;
pub use summary::{BudgetSummary, MissingPrice};

/// Engine identifiers echoed into documents.
pub const ENGINE_NAME: &str = "fe_engine";
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Single error surface for the pipeline orchestration.
#[derive(Debug)]
pub enum PipelineError {
    /// Reading or writing files.
    Io(String),
    /// Catalog shape (unresolved columns, malformed CSV/JSON).
    Schema(String),
    /// Strategy, budget, seed or config file problems.
    Config(String),
    /// The catalog cannot fill a quota.
    Allocate(AllocError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Io(m) => write!(f, "io: {m}"),
            PipelineError::Schema(m) => write!(f, "schema: {m}"),
            PipelineError::Config(m) => write!(f, "config: {m}"),
            PipelineError::Allocate(e) => write!(f, "allocate: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Allocate(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IoError> for PipelineError {
    fn from(e: IoError) -> Self {
        use PipelineError::*;
        match e {
            IoError::Schema(s) => Schema(s.to_string()),
            IoError::Json { pointer, msg } => Schema(format!("json {pointer}: {msg}")),
            IoError::Csv(m) => Schema(format!("csv: {m}")),
            IoError::ConfigSchema { pointer, msg } => Config(format!("{pointer}: {msg}")),
            IoError::Read(m) => Io(format!("read: {m}")),
            IoError::Limit(m) => Io(format!("limit: {m}")),
            IoError::Path(m) => Io(format!("path: {m}")),
        }
    }
}

impl From<fe_io::SchemaError> for PipelineError {
    fn from(e: fe_io::SchemaError) -> Self {
        PipelineError::Schema(e.to_string())
    }
}

impl From<CoreError> for PipelineError {
    fn from(e: CoreError) -> Self {
        PipelineError::Config(e.to_string())
    }
}

impl From<AllocError> for PipelineError {
    fn from(e: AllocError) -> Self {
        PipelineError::Allocate(e)
    }
}
