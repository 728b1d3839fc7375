//! Knowledge Store: discovers and loads Learning Object records.
//!
//! Every record file under the knowledge root yields a [`LoadOutcome`]. A
//! malformed record never aborts the walk and never disappears silently: it
//! is keyed by its `id` when one can be read, and by its relative path in
//! angle brackets otherwise, so the gate report can list it as invalid.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::models::LearningObject;
use crate::report::{Event, Reporter};
use crate::schema::{self, FieldError};

/// Result of loading one record file.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(LearningObject),
    ParseFailed {
        reason: String,
    },
    SchemaInvalid {
        id: Option<String>,
        errors: Vec<FieldError>,
    },
}

/// A record file and what loading it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Path relative to the knowledge root.
    pub path: PathBuf,
    pub outcome: LoadOutcome,
}

impl Record {
    /// Key used in reports and the status map.
    ///
    /// Records without a readable id are keyed as `<relative/path>` so they
    /// cannot shadow a record whose id happens to equal a file name.
    pub fn key(&self) -> String {
        match &self.outcome {
            LoadOutcome::Loaded(lo) => lo.id.clone(),
            LoadOutcome::SchemaInvalid { id: Some(id), .. } => id.clone(),
            _ => format!("<{}>", self.path.to_string_lossy()),
        }
    }

    pub fn learning_object(&self) -> Option<&LearningObject> {
        match &self.outcome {
            LoadOutcome::Loaded(lo) => Some(lo),
            _ => None,
        }
    }
}

/// All records, ordered lexicographically by key.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    pub records: BTreeMap<String, Record>,
}

impl KnowledgeBase {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Successfully loaded Learning Objects, in key order.
    pub fn learning_objects(&self) -> impl Iterator<Item = &LearningObject> {
        self.records.values().filter_map(Record::learning_object)
    }
}

/// Walk the knowledge root and load every record file matching the
/// configured globs.
///
/// Files are visited in sorted path order. When two files declare the same
/// `id` the later one wins and a warning is reported.
pub fn load_knowledge(config: &Config, reporter: &dyn Reporter) -> Result<KnowledgeBase> {
    let root = &config.paths.knowledge_root;
    let mut kb = KnowledgeBase::default();

    if !root.exists() {
        reporter.report(&Event::Warning {
            message: format!("knowledge root does not exist: {}", root.display()),
        });
        return Ok(kb);
    }

    let include_set = config.knowledge.include_set()?;
    let exclude_set = config.knowledge.exclude_set()?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                reporter.report(&Event::Warning {
                    message: format!("skipping unreadable knowledge entry: {}", e),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        if exclude_set.is_match(&relative) || !include_set.is_match(&relative) {
            continue;
        }
        files.push((entry.path().to_path_buf(), relative));
    }

    files.sort_by(|a, b| a.1.cmp(&b.1));

    for (full, relative) in files {
        let record = Record {
            outcome: load_record(&full),
            path: relative,
        };
        let key = record.key();
        if let Some(previous) = kb.records.insert(key.clone(), record) {
            reporter.report(&Event::Warning {
                message: format!(
                    "duplicate id '{}': {} overrides {}",
                    key,
                    kb.records[&key].path.display(),
                    previous.path.display()
                ),
            });
        }
    }

    Ok(kb)
}

/// Parse and validate a single record file.
pub fn load_record(path: &Path) -> LoadOutcome {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            return LoadOutcome::ParseFailed {
                reason: format!("cannot read {}: {}", path.display(), e),
            }
        }
    };

    let value: serde_yaml::Value = match serde_yaml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            return LoadOutcome::ParseFailed {
                reason: e.to_string(),
            }
        }
    };

    match schema::validate(&value) {
        Ok(lo) => LoadOutcome::Loaded(lo),
        Err(errors) => LoadOutcome::SchemaInvalid {
            id: schema::peek_id(&value),
            errors,
        },
    }
}
