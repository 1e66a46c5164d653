//! SHA-256 digests for snippets and derived structures.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Computes the lowercase hex SHA-256 of the exact UTF-8 bytes of `source`.
///
/// No whitespace normalization happens here; a trailing newline changes the hash.
pub fn compute_snippet_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hashes the compact JSON serialization of `value`.
///
/// Callers must pass structures with a deterministic field and element order.
pub fn digest_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let encoded = serde_json::to_string(value)?;
    Ok(compute_snippet_hash(&encoded))
}
