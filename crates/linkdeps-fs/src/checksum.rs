//! SHA-256 digest utilities
//!
//! Digests are lowercase hex strings of fixed length (64 characters). They
//! feed the composite fingerprint lines, so the format must never change.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Length of every digest produced by this module
pub const DIGEST_LEN: usize = 64;

/// Compute the SHA-256 digest of in-memory content.
pub fn content_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Compute the SHA-256 digest of a file's full contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_digest(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(content_digest(&content))
}
