//! crates/fe_io/src/hasher.rs
//!
//! Deterministic hashing and ID builders for canonical artifacts.
//!
//! - Canonical JSON hashing: UTF-8, **sorted object keys**, array order preserved.
//! - IDs derive from canonical bytes: `ROS:` (roster document), `PAIR:` (pair document).
//! - Hex digests are **lowercase**.
//!
//! Use `sha256_canonical(..)` for JSON values/structs and `sha256_hex(..)` for raw bytes.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes;
use crate::IoError;

/// SHA-256 over raw bytes, lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over the canonical JSON bytes of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> Result<String, IoError> {
    let bytes = to_canonical_bytes(value)?;
    Ok(sha256_hex(&bytes))
}

/// `<prefix>:<hex>` content id over canonical bytes.
pub fn content_id<T: Serialize>(prefix: &str, value: &T) -> Result<String, IoError> {
    Ok(format!("{prefix}:{}", sha256_canonical(value)?))
}

/// True for a lowercase 64-hex digest.
pub fn is_lower_hex_64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f'))
}

/// First `n` characters of a 64-hex digest (whole digest for larger `n`).
pub fn short_hex(hex64: &str, n: usize) -> Option<&str> {
    is_lower_hex_64(hex64).then(|| &hex64[..n.min(64)])
}
