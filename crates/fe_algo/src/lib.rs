// crates/fe_algo/src/lib.rs
#![forbid(unsafe_code)]

use core::fmt;

use fe_core::Role;

// ----------------------------- Error surface -----------------------------------------

/// The only hard failure of the allocation layer: the pool cannot physically
/// fill a quota. Soft-constraint misses never surface here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    CatalogInsufficient {
        role: Role,
        required: u32,
        available: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::CatalogInsufficient { role, required, available } => write!(
                f,
                "catalog insufficient for role {role}: {required} required, {available} available"
            ),
        }
    }
}

impl std::error::Error for AllocError {}

// ----------------------------- Modules ----------------------------------------------

pub mod allocator;
pub mod cheapest;
pub mod diversity;
pub mod index;

// Tight, explicit re-exports (avoid wildcard export drift).
pub use allocator::{allocate, allocate_with, evaluate, AllocatorConfig, Evaluation, MAX_TRIES};
pub use cheapest::cheapest_composition;
pub use diversity::{allocate_pair, allocate_pair_with, PairConfig, PairResult, PairStage};
pub use index::{PriorityIndex, TOP_K};
