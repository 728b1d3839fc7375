//! Gate and heal progress reporting.
//!
//! Passes never print directly. They emit [`Event`]s into a [`Reporter`]
//! handed to them by the caller, so tests can run silently and scripts can
//! ask for JSON. Events go to **stderr** so stdout stays free for the final
//! summary.

use std::io::Write;
use std::path::PathBuf;

use crate::models::{AuditAction, ValidationStatus};

/// A single progress event.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    GateStarted {
        source_root: Option<PathBuf>,
        skip_evidence: bool,
    },
    RecordChecked {
        lo_id: String,
        status: ValidationStatus,
        errors: Vec<String>,
    },
    GateFinished {
        verified: usize,
        total: usize,
        report_path: PathBuf,
    },
    HealStarted {
        source_root: PathBuf,
        from_rev: String,
        to_rev: String,
    },
    EvidenceChecked {
        lo_id: String,
        symbol: String,
        action: AuditAction,
    },
    EvidenceFailed {
        lo_id: String,
        symbol: String,
        message: String,
    },
    HealFinished {
        lo_checked: usize,
        flagged: usize,
        errors: usize,
    },
    Warning {
        message: String,
    },
}

/// Receives events from gate and heal.
pub trait Reporter: Send + Sync {
    fn report(&self, event: &Event);
}

/// Human-friendly lines on stderr: "heal  staticmesh.collision.simple  FLAGGED  CT_UseSimpleAsComplex".
pub struct HumanReporter;

impl Reporter for HumanReporter {
    fn report(&self, event: &Event) {
        let line = match event {
            Event::GateStarted {
                source_root: Some(root),
                skip_evidence,
            } => {
                if *skip_evidence {
                    format!("gate  engine {}  (evidence checks skipped)\n", root.display())
                } else {
                    format!("gate  engine {}\n", root.display())
                }
            }
            Event::GateStarted {
                source_root: None, ..
            } => "gate  warning: no source root provided, skipping evidence file checks\n"
                .to_string(),
            Event::RecordChecked {
                lo_id,
                status,
                errors,
            } => {
                let mut s = format!("gate  {}  {}\n", lo_id, status);
                for e in errors {
                    s.push_str(&format!("        - {}\n", e));
                }
                s
            }
            Event::GateFinished { report_path, .. } => {
                format!("gate  report saved to {}\n", report_path.display())
            }
            Event::HealStarted {
                source_root,
                from_rev,
                to_rev,
            } => format!(
                "heal  engine {}  diff {} -> {}\n",
                source_root.display(),
                from_rev,
                to_rev
            ),
            Event::EvidenceChecked {
                lo_id,
                symbol,
                action,
            } => format!("heal  {}  {}  {}\n", lo_id, action, symbol),
            Event::EvidenceFailed {
                lo_id,
                symbol,
                message,
            } => format!("heal  {}  ERROR  {}: {}\n", lo_id, symbol, message),
            Event::HealFinished { .. } => return,
            Event::Warning { message } => format!("warning: {}\n", message),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable events: one JSON object per line on stderr.
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&self, event: &Event) {
        let obj = match event {
            Event::GateStarted {
                source_root,
                skip_evidence,
            } => serde_json::json!({
                "event": "gate_started",
                "source_root": source_root.as_ref().map(|p| p.display().to_string()),
                "skip_evidence": skip_evidence
            }),
            Event::RecordChecked {
                lo_id,
                status,
                errors,
            } => serde_json::json!({
                "event": "record_checked",
                "lo_id": lo_id,
                "status": status,
                "errors": errors
            }),
            Event::GateFinished {
                verified,
                total,
                report_path,
            } => serde_json::json!({
                "event": "gate_finished",
                "verified": verified,
                "total": total,
                "report_path": report_path.display().to_string()
            }),
            Event::HealStarted {
                source_root,
                from_rev,
                to_rev,
            } => serde_json::json!({
                "event": "heal_started",
                "source_root": source_root.display().to_string(),
                "from_rev": from_rev,
                "to_rev": to_rev
            }),
            Event::EvidenceChecked {
                lo_id,
                symbol,
                action,
            } => serde_json::json!({
                "event": "evidence_checked",
                "lo_id": lo_id,
                "symbol": symbol,
                "action": action
            }),
            Event::EvidenceFailed {
                lo_id,
                symbol,
                message,
            } => serde_json::json!({
                "event": "evidence_failed",
                "lo_id": lo_id,
                "symbol": symbol,
                "message": message
            }),
            Event::HealFinished {
                lo_checked,
                flagged,
                errors,
            } => serde_json::json!({
                "event": "heal_finished",
                "lo_checked": lo_checked,
                "flagged": flagged,
                "errors": errors
            }),
            Event::Warning { message } => serde_json::json!({
                "event": "warning",
                "message": message
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter.
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn report(&self, _event: &Event) {}
}

/// Reporter selection for the CLI.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReportMode {
    Off,
    Human,
    Json,
}

impl ReportMode {
    /// Human output when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ReportMode::Human
        } else {
            ReportMode::Off
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(Self::default_for_tty()),
            "off" => Some(ReportMode::Off),
            "human" => Some(ReportMode::Human),
            "json" => Some(ReportMode::Json),
            _ => None,
        }
    }

    pub fn reporter(&self) -> Box<dyn Reporter> {
        match self {
            ReportMode::Off => Box::new(SilentReporter),
            ReportMode::Human => Box::new(HumanReporter),
            ReportMode::Json => Box::new(JsonReporter),
        }
    }
}
