//! Snippet canonicalization.
//!
//! Strips `//` line comments, then `/* ... */` block comments (which may span
//! lines), then removes every whitespace character. Formatting-only and
//! comment-only edits therefore vanish before hashing.
//!
//! Comment-like sequences inside string literals are stripped too. The
//! normalizer is purely textual and has no notion of literals.

use regex::Regex;
use std::sync::LazyLock;

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//.*").expect("valid regex"));
static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));

/// Canonicalize `text`. Total and deterministic.
///
/// Removing whitespace can join `/ /` into `//`, so the passes repeat until
/// the text stops changing. Each repeat strictly shortens the text, which
/// bounds the loop and makes the result idempotent.
pub fn normalize(text: &str) -> String {
    let mut current = strip_once(text);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> String {
    let without_line = LINE_COMMENT.replace_all(text, "");
    let without_block = BLOCK_COMMENT.replace_all(&without_line, "");
    without_block.chars().filter(|c| !c.is_whitespace()).collect()
}
