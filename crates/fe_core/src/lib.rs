//! fe_core: Core types, roles, strategy presets, ordering helpers, and seeded RNG.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! engine (`fe_io`, `fe_algo`, `fe_pipeline`, `fe_cli`).
//!
//! - Roles: `Role` (P, D, C, A) in canonical order
//! - Candidates and the read-only `Catalog` snapshot
//! - Strategy: `AllocationSpec`, `ShareBand`, `Tolerance`, `StrategyMode` presets
//! - Outputs: `Roster`, `AllocationResult`
//! - Deterministic priority / price ordering helpers
//! - Seedable string-keyed RNG (`SeedRng`)
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        UnknownRole,
        UnknownToken,
        InvalidBand(&'static str),
        InvalidBudget,
        InvalidQuota(&'static str),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::UnknownRole => write!(f, "unknown role"),
                CoreError::UnknownToken => write!(f, "unknown token"),
                CoreError::InvalidBand(r) => write!(f, "invalid share band for role {r}"),
                CoreError::InvalidBudget => write!(f, "invalid budget window"),
                CoreError::InvalidQuota(r) => write!(f, "invalid quota for role {r}"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

/// Define an enum with explicit wire tokens (serde rename + `FromStr` + `as_str`).
/// Serde derives stay feature-aware.
macro_rules! token_enum {
    ($(#[$meta:meta])* $name:ident => { $($(#[$vmeta:meta])* $variant:ident = $token:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[cfg_attr(feature = "serde", serde(rename = $token))]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $name {
            type Err = $crate::errors::CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($token => Ok($name::$variant),)+
                    _ => Err($crate::errors::CoreError::UnknownToken),
                }
            }
        }
    };
}

pub mod determinism;
pub mod entities;
pub mod rng;
pub mod roles;
pub mod roster;
pub mod strategy;

pub use entities::{CandidateRecord, Catalog};
pub use errors::CoreError;
pub use roles::Role;
pub use roster::{AllocationMethod, AllocationResult, Roster};
pub use strategy::{AllocationSpec, ShareBand, StrategyMode, Tolerance};
