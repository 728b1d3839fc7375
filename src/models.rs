//! Core data models used throughout UKE.
//!
//! These types represent the Learning Objects read from the knowledge
//! directory, the evidence they cite, and the statuses and audit records
//! produced by the gate and heal passes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of documentation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoType {
    Concept,
    Task,
    Troubleshooting,
    Reference,
}

impl LoType {
    pub const ALL: [LoType; 4] = [
        LoType::Concept,
        LoType::Task,
        LoType::Troubleshooting,
        LoType::Reference,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoType::Concept => "concept",
            LoType::Task => "task",
            LoType::Troubleshooting => "troubleshooting",
            LoType::Reference => "reference",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// A claim tying a Learning Object to a symbol in a source file.
///
/// `snippet_hash` is the ground truth captured at authoring time. Nothing in
/// this crate writes it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Path relative to the source root.
    pub file: String,
    /// Literal substring used as the anchor.
    pub symbol: String,
    /// Opaque identifier; not part of the hash.
    pub symbol_id: String,
    pub snippet_hash: String,
}

/// A documentation unit with cited source evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningObject {
    pub id: String,
    #[serde(rename = "type")]
    pub lo_type: LoType,
    pub title: String,
    pub description: String,
    /// Ordered; the order matters to path planning but not to verification.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub evidence: Vec<EvidenceItem>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub skill_level: Option<String>,
}

/// Status recorded per Learning Object in the gate report and status map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Verified,
    NeedsReview,
    Invalid,
    /// Reserved. No pass currently assigns it.
    Stale,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Verified => "verified",
            ValidationStatus::NeedsReview => "needs_review",
            ValidationStatus::Invalid => "invalid",
            ValidationStatus::Stale => "stale",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of re-verifying a single evidence item during heal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Verified,
    Flagged,
    Error,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Verified => "VERIFIED",
            AuditAction::Flagged => "FLAGGED",
            AuditAction::Error => "ERROR",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One durable record per verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Collision-free id, also part of the file name.
    pub id: String,
    /// Serialized as RFC 3339.
    pub timestamp: DateTime<Utc>,
    pub lo_id: String,
    pub symbol: String,
    pub file: String,
    pub old_hash: String,
    /// `None` when the snippet could not be located.
    pub new_hash: Option<String>,
    pub action: AuditAction,
    pub reason: String,
    /// Revision identifiers passed to heal. Informational only.
    pub from_rev: String,
    pub to_rev: String,
}
