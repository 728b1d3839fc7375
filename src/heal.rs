//! Heal: hash-based drift detection.
//!
//! Re-locates and re-hashes every evidence item of every Learning Object and
//! compares the digest with the recorded `snippet_hash`. Each item ends in
//! exactly one of three states and gets one audit entry:
//!
//! | Outcome | Audit action | Meaning |
//! |---------|--------------|---------|
//! | digest matches | `VERIFIED` | unchanged, or changed only in whitespace/comments |
//! | digest differs | `FLAGGED` | token-level change, needs human review |
//! | file or symbol missing | `ERROR` | evidence could not be located |
//!
//! Failures are per item; the batch always runs to the end. Only failing to
//! write an audit entry or the status map aborts the run.
//!
//! The two revision identifiers are recorded on every audit entry but do not
//! narrow which evidence is checked. The recorded `snippet_hash` is never
//! rewritten.

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::path::Path;

use crate::audit::{AuditLog, AuditRecord, HASH_COMPARISON_REASON};
use crate::config::Config;
use crate::gate::write_json;
use crate::hash::hash_evidence;
use crate::knowledge::{load_knowledge, LoadOutcome};
use crate::locate::LocateError;
use crate::models::{AuditAction, EvidenceItem, ValidationStatus};
use crate::report::{Event, Reporter};

/// Terminal state of one evidence item within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Verified { hash: String },
    NeedsReview { new_hash: String },
    Error(LocateError),
}

impl ItemOutcome {
    pub fn action(&self) -> AuditAction {
        match self {
            ItemOutcome::Verified { .. } => AuditAction::Verified,
            ItemOutcome::NeedsReview { .. } => AuditAction::Flagged,
            ItemOutcome::Error(_) => AuditAction::Error,
        }
    }
}

/// Counters and per-LO statuses from one heal run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HealSummary {
    pub lo_checked: usize,
    pub items_checked: usize,
    pub verified: usize,
    /// Review counter: items whose digest no longer matches.
    pub flagged: usize,
    pub errors: usize,
    /// Records skipped because they failed to parse or validate.
    pub skipped: usize,
    pub status_map: BTreeMap<String, ValidationStatus>,
}

/// Re-derive the digest of one evidence item and classify it.
pub fn check_evidence(
    source_root: &Path,
    evidence: &EvidenceItem,
    context_lines: usize,
) -> ItemOutcome {
    match hash_evidence(source_root, &evidence.file, &evidence.symbol, context_lines) {
        Ok(hash) if hash == evidence.snippet_hash => ItemOutcome::Verified { hash },
        Ok(new_hash) => ItemOutcome::NeedsReview { new_hash },
        Err(e) => ItemOutcome::Error(e),
    }
}

/// Run heal over the whole knowledge base.
///
/// Requires `config.paths.source_root`. Rewrites the status map and appends
/// one audit entry per evidence item.
pub fn run_heal(
    config: &Config,
    from_rev: &str,
    to_rev: &str,
    reporter: &dyn Reporter,
) -> Result<HealSummary> {
    let Some(source_root) = config.paths.source_root.as_deref() else {
        bail!("heal requires a source root (--source-root or paths.source_root)");
    };

    reporter.report(&Event::HealStarted {
        source_root: source_root.to_path_buf(),
        from_rev: from_rev.to_string(),
        to_rev: to_rev.to_string(),
    });
    if !source_root.is_dir() {
        reporter.report(&Event::Warning {
            message: format!(
                "source root is not a directory: {}; every evidence item will error",
                source_root.display()
            ),
        });
    }

    let audit = AuditLog::open(&config.audit_dir())?;
    let kb = load_knowledge(config, reporter)?;
    let mut summary = HealSummary::default();

    for (key, record) in &kb.records {
        let lo = match &record.outcome {
            LoadOutcome::Loaded(lo) => lo,
            _ => {
                reporter.report(&Event::Warning {
                    message: format!(
                        "skipping invalid record {} (run `uke gate` for details)",
                        record.path.display()
                    ),
                });
                summary.skipped += 1;
                summary
                    .status_map
                    .insert(key.clone(), ValidationStatus::Invalid);
                continue;
            }
        };

        summary.lo_checked += 1;
        let mut lo_flagged = false;
        let mut lo_errored = false;

        for ev in &lo.evidence {
            let outcome = check_evidence(source_root, ev, config.evidence.context_lines);
            summary.items_checked += 1;

            let (new_hash, reason) = match &outcome {
                ItemOutcome::Verified { hash } => {
                    summary.verified += 1;
                    (Some(hash.clone()), HASH_COMPARISON_REASON.to_string())
                }
                ItemOutcome::NeedsReview { new_hash } => {
                    summary.flagged += 1;
                    lo_flagged = true;
                    (Some(new_hash.clone()), HASH_COMPARISON_REASON.to_string())
                }
                ItemOutcome::Error(e) => {
                    summary.errors += 1;
                    lo_errored = true;
                    (None, e.to_string())
                }
            };

            match &outcome {
                ItemOutcome::Error(_) => reporter.report(&Event::EvidenceFailed {
                    lo_id: lo.id.clone(),
                    symbol: ev.symbol.clone(),
                    message: reason.clone(),
                }),
                _ => reporter.report(&Event::EvidenceChecked {
                    lo_id: lo.id.clone(),
                    symbol: ev.symbol.clone(),
                    action: outcome.action(),
                }),
            }

            audit.append(
                AuditRecord {
                    lo_id: &lo.id,
                    symbol: &ev.symbol,
                    file: &ev.file,
                    old_hash: &ev.snippet_hash,
                    new_hash,
                    action: outcome.action(),
                    reason,
                },
                from_rev,
                to_rev,
            )?;
        }

        let status = if lo_flagged {
            ValidationStatus::NeedsReview
        } else if lo_errored {
            ValidationStatus::Invalid
        } else {
            ValidationStatus::Verified
        };
        summary.status_map.insert(key.clone(), status);
    }

    write_json(&config.status_path(), &summary.status_map)?;

    reporter.report(&Event::HealFinished {
        lo_checked: summary.lo_checked,
        flagged: summary.flagged,
        errors: summary.errors,
    });

    Ok(summary)
}
