//! Gate: schema and evidence-existence validation.
//!
//! Every record under the knowledge root gets an entry in the report,
//! including records that fail to parse. When a source root is given (and
//! evidence checks are not skipped) each evidence file must exist; contents
//! are not read here.
//!
//! Both outputs fully replace any earlier run's files.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::Config;
use crate::knowledge::{load_knowledge, LoadOutcome, Record};
use crate::models::ValidationStatus;
use crate::report::{Event, Reporter};

/// Per-LO entry in `gate_report.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateResult {
    pub status: ValidationStatus,
    pub errors: Vec<String>,
}

#[derive(Debug, Default)]
pub struct GateReport {
    pub results: BTreeMap<String, GateResult>,
    pub status_map: BTreeMap<String, ValidationStatus>,
}

impl GateReport {
    pub fn add_result(&mut self, lo_id: &str, status: ValidationStatus, errors: Vec<String>) {
        self.results
            .insert(lo_id.to_string(), GateResult { status, errors });
        self.status_map.insert(lo_id.to_string(), status);
    }

    pub fn verified_count(&self) -> usize {
        self.status_map
            .values()
            .filter(|s| **s == ValidationStatus::Verified)
            .count()
    }

    pub fn total(&self) -> usize {
        self.status_map.len()
    }

    pub fn save(&self, report_path: &Path, status_path: &Path) -> Result<()> {
        write_json(report_path, &self.results)?;
        write_json(status_path, &self.status_map)
    }
}

/// Classify one loaded record.
pub fn check_record(
    record: &Record,
    source_root: Option<&Path>,
    skip_evidence: bool,
) -> (ValidationStatus, Vec<String>) {
    let lo = match &record.outcome {
        LoadOutcome::ParseFailed { reason } => {
            return (
                ValidationStatus::Invalid,
                vec![format!("YAML Parse Error: {}", reason)],
            )
        }
        LoadOutcome::SchemaInvalid { errors, .. } => {
            return (
                ValidationStatus::Invalid,
                errors
                    .iter()
                    .map(|e| format!("Schema Error: {}", e))
                    .collect(),
            )
        }
        LoadOutcome::Loaded(lo) => lo,
    };

    let mut errors = Vec::new();
    if let (Some(root), false) = (source_root, skip_evidence) {
        for ev in &lo.evidence {
            if !root.join(&ev.file).exists() {
                errors.push(format!("Evidence file not found: {}", ev.file));
            }
        }
    }

    if errors.is_empty() {
        (ValidationStatus::Verified, errors)
    } else {
        (ValidationStatus::Invalid, errors)
    }
}

/// Run the gate over the whole knowledge base and persist both outputs.
pub fn run_gate(
    config: &Config,
    skip_evidence: bool,
    reporter: &dyn Reporter,
) -> Result<GateReport> {
    let source_root = config.paths.source_root.as_deref();
    reporter.report(&Event::GateStarted {
        source_root: source_root.map(Path::to_path_buf),
        skip_evidence,
    });

    let kb = load_knowledge(config, reporter)?;
    let mut report = GateReport::default();

    for (key, record) in &kb.records {
        let (status, errors) = check_record(record, source_root, skip_evidence);
        reporter.report(&Event::RecordChecked {
            lo_id: key.clone(),
            status,
            errors: errors.clone(),
        });
        report.add_result(key, status, errors);
    }

    let report_path = config.gate_report_path();
    report.save(&report_path, &config.status_path())?;

    reporter.report(&Event::GateFinished {
        verified: report.verified_count(),
        total: report.total(),
        report_path,
    });

    Ok(report)
}

/// Pretty-print `value` to `path`, creating parent directories.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
