//! crates/rpt_io/src/hasher.rs
//!
//! SHA-256 helpers. The payload fingerprint is taken over **canonical JSON
//! bytes**, so it does not depend on struct field order, only on content.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes;
use crate::IoError;

/// SHA-256 over raw bytes (lowercase hex).
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 over the canonical JSON of any serializable value.
pub fn payload_fingerprint<T: Serialize>(value: &T) -> Result<String, IoError> {
    let bytes = to_canonical_bytes(value)?;
    Ok(sha256_hex(&bytes))
}
