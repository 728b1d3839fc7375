//! Content hashing over normalized snippets.
//!
//! The digest is the only comparison primitive used by gate and heal. Two
//! snippets with equal digests are treated as identical.

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::locate::{locate, LocateError};
use crate::normalize::normalize;

/// SHA-256 of the normalized text, lowercase hex.
pub fn hash_snippet(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(text).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Locate `symbol` under `root` and hash the surrounding window.
pub fn hash_evidence(
    root: &Path,
    relative_file: &str,
    symbol: &str,
    context_lines: usize,
) -> Result<String, LocateError> {
    let window = locate(root, relative_file, symbol, context_lines)?;
    Ok(hash_snippet(&window.text))
}
