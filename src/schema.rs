//! Field-by-field Learning Object validation.
//!
//! Records are parsed into a loose [`serde_yaml::Value`] first and then
//! converted here, so every problem in a record is reported at once as a
//! list of [`FieldError`]s instead of stopping at the first serde error.
//! Unknown keys are ignored.

use serde_yaml::Value;
use std::path::{Component, Path};
use thiserror::Error;

use crate::models::{EvidenceItem, LearningObject, LoType};

/// One schema violation, tagged by cause. `field` is a dotted path such as
/// `evidence[1].symbol`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field}: field required")]
    Missing { field: String },

    #[error("{field}: expected {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("{field}: '{value}' is not one of {allowed}")]
    UnknownVariant {
        field: String,
        value: String,
        allowed: String,
    },

    #[error("{field}: must not be empty")]
    Empty { field: String },

    #[error("{field}: evidence item must be a mapping")]
    InvalidItem { field: String },

    #[error("{field}: '{path}' must be relative to the source root")]
    AbsolutePath { field: String, path: String },

    #[error("{field}: '{path}' must not leave the source root")]
    EscapesRoot { field: String, path: String },
}

/// Read the `id` of a record without validating anything else. Used to key
/// report entries for records that fail validation.
pub fn peek_id(value: &Value) -> Option<String> {
    value
        .get("id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Convert a parsed record into a [`LearningObject`], or return every
/// violation found.
pub fn validate(value: &Value) -> Result<LearningObject, Vec<FieldError>> {
    let mut errors = Vec::new();

    if !value.is_mapping() {
        errors.push(FieldError::WrongType {
            field: "<root>".to_string(),
            expected: "a mapping",
        });
        return Err(errors);
    }

    let id = required_str(value, "id", "id", true, &mut errors);
    let lo_type = match required_str(value, "type", "type", false, &mut errors) {
        Some(raw) => match LoType::parse(&raw) {
            Some(t) => Some(t),
            None => {
                errors.push(FieldError::UnknownVariant {
                    field: "type".to_string(),
                    value: raw,
                    allowed: LoType::ALL
                        .iter()
                        .map(|t| t.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
                None
            }
        },
        None => None,
    };
    let title = required_str(value, "title", "title", false, &mut errors);
    let description = required_str(value, "description", "description", false, &mut errors);
    let prerequisites = string_list(value, "prerequisites", &mut errors);
    let roles = string_list(value, "roles", &mut errors);
    let skill_level = optional_str(value, "skill_level", &mut errors);
    let evidence = evidence_list(value, &mut errors);

    match (id, lo_type, title, description) {
        (Some(id), Some(lo_type), Some(title), Some(description)) if errors.is_empty() => {
            Ok(LearningObject {
                id,
                lo_type,
                title,
                description,
                prerequisites,
                evidence,
                roles,
                skill_level,
            })
        }
        _ => Err(errors),
    }
}

fn required_str(
    value: &Value,
    key: &str,
    field: &str,
    non_empty: bool,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value.get(key) {
        None | Some(Value::Null) => {
            errors.push(FieldError::Missing {
                field: field.to_string(),
            });
            None
        }
        Some(Value::String(s)) => {
            if non_empty && s.trim().is_empty() {
                errors.push(FieldError::Empty {
                    field: field.to_string(),
                });
                None
            } else {
                Some(s.clone())
            }
        }
        Some(_) => {
            errors.push(FieldError::WrongType {
                field: field.to_string(),
                expected: "a string",
            });
            None
        }
    }
}

fn optional_str(value: &Value, key: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    match value.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::WrongType {
                field: key.to_string(),
                expected: "a string",
            });
            None
        }
    }
}

fn string_list(value: &Value, key: &str, errors: &mut Vec<FieldError>) -> Vec<String> {
    let items = match value.get(key) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Sequence(items)) => items,
        Some(_) => {
            errors.push(FieldError::WrongType {
                field: key.to_string(),
                expected: "a list of strings",
            });
            return Vec::new();
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(s) => out.push(s.to_string()),
            None => errors.push(FieldError::WrongType {
                field: format!("{}[{}]", key, i),
                expected: "a string",
            }),
        }
    }
    out
}

fn evidence_list(value: &Value, errors: &mut Vec<FieldError>) -> Vec<EvidenceItem> {
    let items = match value.get("evidence") {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Sequence(items)) => items,
        Some(_) => {
            errors.push(FieldError::WrongType {
                field: "evidence".to_string(),
                expected: "a list of evidence items",
            });
            return Vec::new();
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let prefix = format!("evidence[{}]", i);
        if !item.is_mapping() {
            errors.push(FieldError::InvalidItem { field: prefix });
            continue;
        }

        let file = required_str(item, "file", &format!("{}.file", prefix), true, errors);
        let symbol = required_str(item, "symbol", &format!("{}.symbol", prefix), true, errors);
        let symbol_id = required_str(
            item,
            "symbol_id",
            &format!("{}.symbol_id", prefix),
            false,
            errors,
        );
        let snippet_hash = required_str(
            item,
            "snippet_hash",
            &format!("{}.snippet_hash", prefix),
            false,
            errors,
        );

        if let Some(f) = &file {
            let path = Path::new(f);
            if path.is_absolute() {
                errors.push(FieldError::AbsolutePath {
                    field: format!("{}.file", prefix),
                    path: f.clone(),
                });
                continue;
            }
            if path.components().any(|c| matches!(c, Component::ParentDir)) {
                errors.push(FieldError::EscapesRoot {
                    field: format!("{}.file", prefix),
                    path: f.clone(),
                });
                continue;
            }
        }

        if let (Some(file), Some(symbol), Some(symbol_id), Some(snippet_hash)) =
            (file, symbol, symbol_id, snippet_hash)
        {
            out.push(EvidenceItem {
                file,
                symbol,
                symbol_id,
                snippet_hash,
            });
        }
    }
    out
}
