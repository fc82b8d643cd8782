//! Canonical JSON digests.
//!
//! `serde_json::Value` objects keep their keys sorted, so serializing through
//! `Value` yields a stable byte sequence for the same logical content.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::error::Result;

/// SHA-256 hex digest of raw bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// SHA-256 hex digest of the canonical (key-sorted, compact) JSON encoding.
pub fn canonical_digest<T: Serialize>(value: &T) -> Result<String> {
    let canonical = serde_json::to_value(value)?;
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(sha256_hex(&bytes))
}
