//! Append-only audit trail.
//!
//! Each verification attempt becomes one JSON file under the audit
//! directory. File names embed a UUID and are created with `create_new`, so
//! entries from concurrent or same-second runs never overwrite each other.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::models::{AuditAction, AuditEntry};

/// Reason recorded for hash comparisons that ran to completion.
pub const HASH_COMPARISON_REASON: &str = "Normalized hash comparison";

/// Writes audit entries into one directory.
pub struct AuditLog {
    dir: PathBuf,
}

/// Fields of an entry that vary per evidence item.
pub struct AuditRecord<'a> {
    pub lo_id: &'a str,
    pub symbol: &'a str,
    pub file: &'a str,
    pub old_hash: &'a str,
    pub new_hash: Option<String>,
    pub action: AuditAction,
    pub reason: String,
}

impl AuditLog {
    /// Open the audit directory, creating it if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create audit directory: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist one entry. Failure here is fatal to the run.
    pub fn append(
        &self,
        record: AuditRecord<'_>,
        from_rev: &str,
        to_rev: &str,
    ) -> Result<AuditEntry> {
        let now = Utc::now();
        let entry = AuditEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: now,
            lo_id: record.lo_id.to_string(),
            symbol: record.symbol.to_string(),
            file: record.file.to_string(),
            old_hash: record.old_hash.to_string(),
            new_hash: record.new_hash,
            action: record.action,
            reason: record.reason,
            from_rev: from_rev.to_string(),
            to_rev: to_rev.to_string(),
        };

        let path = self.dir.join(entry_file_name(&now, &entry.lo_id, &entry.id));
        let mut json = serde_json::to_string_pretty(&entry)?;
        json.push('\n');
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("Failed to create audit entry: {}", path.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write audit entry: {}", path.display()))?;

        Ok(entry)
    }
}

/// Longest `lo_id` fragment kept in a file name. The full id lives in the
/// entry itself; the UUID keeps names unique.
const MAX_ID_IN_FILE_NAME: usize = 64;

/// `<YYYYmmddTHHMMSS>_<lo_id>_<uuid>.json`. The id part keeps only
/// `[A-Za-z0-9._-]` and is truncated, so any valid record id yields a
/// portable name well under `NAME_MAX`.
fn entry_file_name(now: &DateTime<Utc>, lo_id: &str, id: &str) -> String {
    let safe_id: String = lo_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_ID_IN_FILE_NAME)
        .collect();
    format!("{}_{}_{}.json", now.format("%Y%m%dT%H%M%S"), safe_id, id)
}

/// Read every entry in an audit directory, oldest first.
pub fn read_entries(dir: &Path) -> Result<Vec<AuditEntry>> {
    let mut entries = Vec::new();
    if !dir.exists() {
        return Ok(entries);
    }
    for item in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read audit directory: {}", dir.display()))?
    {
        let path = item?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let content = std::fs::read_to_string(&path)?;
        let entry: AuditEntry = serde_json::from_str(&content)
            .with_context(|| format!("Malformed audit entry: {}", path.display()))?;
        entries.push(entry);
    }
    entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
    Ok(entries)
}
