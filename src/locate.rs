//! Symbol-anchored snippet extraction.
//!
//! Finds the first literal occurrence of a symbol in a source file and
//! returns the lines around it. The search is a plain substring match over
//! the whole file text; later occurrences are never inspected.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default size of the context window, in lines.
pub const DEFAULT_CONTEXT_LINES: usize = 40;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocateError {
    #[error("Evidence file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Symbol '{symbol}' not found in {}", .file.display())]
    SymbolNotFound { symbol: String, file: PathBuf },
}

/// A located snippet and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceWindow {
    /// Zero-based line of the first occurrence of the symbol.
    pub anchor_line: usize,
    /// Zero-based, inclusive.
    pub start_line: usize,
    /// Zero-based, inclusive.
    pub end_line: usize,
    pub text: String,
}

/// Locate `symbol` in `root/relative_file` and extract the window
/// `[line - context_lines/2, line + context_lines/2]`, clamped to the file.
///
/// Unreadable files are reported as [`LocateError::FileNotFound`]. Invalid
/// UTF-8 is replaced rather than rejected.
pub fn locate(
    root: &Path,
    relative_file: &str,
    symbol: &str,
    context_lines: usize,
) -> Result<SourceWindow, LocateError> {
    let path = root.join(relative_file);
    let bytes = std::fs::read(&path).map_err(|_| LocateError::FileNotFound(path.clone()))?;
    let content = String::from_utf8_lossy(&bytes);

    let offset = content
        .find(symbol)
        .ok_or_else(|| LocateError::SymbolNotFound {
            symbol: symbol.to_string(),
            file: path.clone(),
        })?;

    let anchor_line = content[..offset].matches('\n').count();
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        // Only reachable with an empty symbol in an empty file.
        return Ok(SourceWindow {
            anchor_line: 0,
            start_line: 0,
            end_line: 0,
            text: String::new(),
        });
    }

    let half = context_lines / 2;
    let last_line = lines.len() - 1;
    let start_line = anchor_line.saturating_sub(half).min(last_line);
    let end_line = (anchor_line + half).min(last_line);

    Ok(SourceWindow {
        anchor_line,
        start_line,
        end_line,
        text: lines[start_line..=end_line].join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn numbered_file(dir: &Path, name: &str, count: usize, anchor_at: usize) {
        let body = (0..count)
            .map(|i| {
                if i == anchor_at {
                    format!("line {} ANCHOR", i)
                } else {
                    format!("line {}", i)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn window_centered_on_anchor() {
        let tmp = TempDir::new().unwrap();
        numbered_file(tmp.path(), "a.cpp", 100, 50);

        let w = locate(tmp.path(), "a.cpp", "ANCHOR", 40).unwrap();
        assert_eq!(w.anchor_line, 50);
        assert_eq!(w.start_line, 30);
        assert_eq!(w.end_line, 70);
        assert_eq!(w.text.lines().count(), 41);
        assert!(w.text.starts_with("line 30"));
        assert!(w.text.ends_with("line 70"));
    }

    #[test]
    fn window_clamped_at_file_start() {
        let tmp = TempDir::new().unwrap();
        numbered_file(tmp.path(), "a.cpp", 100, 3);

        let w = locate(tmp.path(), "a.cpp", "ANCHOR", 40).unwrap();
        assert_eq!(w.start_line, 0);
        assert_eq!(w.end_line, 23);
    }

    #[test]
    fn window_clamped_at_file_end() {
        let tmp = TempDir::new().unwrap();
        numbered_file(tmp.path(), "a.cpp", 30, 28);

        let w = locate(tmp.path(), "a.cpp", "ANCHOR", 40).unwrap();
        assert_eq!(w.start_line, 8);
        assert_eq!(w.end_line, 29);
        assert!(w.text.ends_with("line 29"));
    }

    #[test]
    fn first_occurrence_wins() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("dup.h"), "a\nFoo\nb\nc\nFoo\n").unwrap();

        let w = locate(tmp.path(), "dup.h", "Foo", 2).unwrap();
        assert_eq!(w.anchor_line, 1);
        assert_eq!(w.text, "a\nFoo\nb");
    }

    #[test]
    fn substring_match_spans_lines() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("s.h"), "x\nenum E {\n  A\n};\n").unwrap();

        let w = locate(tmp.path(), "s.h", "{\n  A", 0).unwrap();
        assert_eq!(w.anchor_line, 1);
        assert_eq!(w.text, "enum E {");
    }

    #[test]
    fn missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = locate(tmp.path(), "Nope.cpp", "X", 40).unwrap_err();
        assert!(matches!(err, LocateError::FileNotFound(_)));
        assert!(err.to_string().contains("Nope.cpp"));
    }

    #[test]
    fn missing_symbol() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.cpp"), "int main() {}\n").unwrap();

        let err = locate(tmp.path(), "a.cpp", "CT_UseSimpleAsComplex", 40).unwrap_err();
        assert!(matches!(err, LocateError::SymbolNotFound { .. }));
        assert!(err.to_string().contains("CT_UseSimpleAsComplex"));
    }

    #[test]
    fn deterministic_for_unchanged_file() {
        let tmp = TempDir::new().unwrap();
        numbered_file(tmp.path(), "a.cpp", 60, 20);

        let first = locate(tmp.path(), "a.cpp", "ANCHOR", 40).unwrap();
        let second = locate(tmp.path(), "a.cpp", "ANCHOR", 40).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tolerates_invalid_utf8() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.cpp"), b"\xff\xfe\nSymbol here\n").unwrap();

        let w = locate(tmp.path(), "b.cpp", "Symbol", 40).unwrap();
        assert_eq!(w.anchor_line, 1);
    }
}
