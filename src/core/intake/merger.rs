//! Folds human answers back into the structured record and the brief text.

use super::detector::MissingFieldDetector;
use super::record::{CATEGORIES, STATUS_ENHANCED, StructuredRecord};
use super::registry::FieldRegistry;
use crate::error::AnswerError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

pub const PROVENANCE_NOTE: &str = "Enhanced with user-provided information";
pub const ADDITIONAL_INFO_HEADER: &str = "=== ADDITIONAL INFORMATION PROVIDED ===";
const NOTE_SEPARATOR: &str = " | ";

/// One set of answers from the human responder, keyed by dotted path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerBatch {
    /// Opaque identity used by the re-entrancy guard.
    pub id: String,
    pub answers: Map<String, Value>,
}

impl AnswerBatch {
    /// Batch identified by the SHA-256 fingerprint of its canonical JSON.
    pub fn new(answers: Map<String, Value>) -> Self {
        let canonical = Value::Object(answers.clone()).to_string();
        let id = hex::encode(Sha256::digest(canonical.as_bytes()));
        Self { id, answers }
    }

    /// Batch carrying a caller-supplied id, e.g. a chat message id.
    pub fn with_id(id: impl Into<String>, answers: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            answers,
        }
    }

    pub fn from_json_value(value: Value) -> Result<Self, AnswerError> {
        match value {
            Value::Object(answers) => Ok(Self::new(answers)),
            _ => Err(AnswerError::NotAMapping),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

fn check_entry(path: &str, value: &Value) -> Result<(), AnswerError> {
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(AnswerError::InvalidPath {
            path: path.to_string(),
        });
    }
    if CATEGORIES.contains(&path) {
        return Err(AnswerError::WholeCategory {
            path: path.to_string(),
        });
    }
    match value {
        Value::Null => Err(AnswerError::NullValue {
            path: path.to_string(),
        }),
        Value::Object(_) => Err(AnswerError::NestedMapping {
            path: path.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Splits answers into well-formed entries and the rejections for the rest.
pub fn partition_answers(answers: &Map<String, Value>) -> (Map<String, Value>, Vec<AnswerError>) {
    let mut accepted = Map::new();
    let mut rejected = Vec::new();
    for (path, value) in answers {
        match check_entry(path, value) {
            Ok(()) => {
                accepted.insert(path.clone(), value.clone());
            }
            Err(err) => rejected.push(err),
        }
    }
    (accepted, rejected)
}

/// Well-formed entries only; every rejected entry is logged and dropped.
pub fn accepted_answers(answers: &Map<String, Value>) -> Map<String, Value> {
    let (accepted, rejected) = partition_answers(answers);
    for err in rejected {
        tracing::warn!(error = %err, "Dropping malformed answer entry");
    }
    accepted
}

/// Returns a copy of `record` with every well-formed answer applied.
///
/// Re-applying the same answers yields the same record.
pub fn merge_into_record(
    record: &StructuredRecord,
    answers: &Map<String, Value>,
    registry: &FieldRegistry,
) -> StructuredRecord {
    let mut merged = record.clone();
    for (path, value) in accepted_answers(answers) {
        if registry.describe(&path).is_none() {
            tracing::debug!(path = %path, "Merging answer for untracked field");
        }
        merged.set_path(&path, value);
    }

    merged.insert("extraction_status", Value::String(STATUS_ENHANCED.into()));
    let notes = merged.extraction_notes();
    let notes = if notes.contains(PROVENANCE_NOTE) {
        notes.to_string()
    } else if notes.trim().is_empty() {
        PROVENANCE_NOTE.to_string()
    } else {
        format!("{notes}{NOTE_SEPARATOR}{PROVENANCE_NOTE}")
    };
    merged.insert("extraction_notes", Value::String(notes));

    let missing = MissingFieldDetector::new(*registry).detect(&merged);
    merged.insert(
        "missing_information",
        Value::Array(missing.into_vec().into_iter().map(Value::String).collect()),
    );
    merged.refresh_metrics();
    merged
}

/// Registry fields first in declaration order, then untracked paths.
fn in_registry_order<'a>(
    answers: &'a Map<String, Value>,
    registry: &FieldRegistry,
) -> Vec<(&'a String, &'a Value)> {
    let mut ordered: Vec<_> = answers.iter().collect();
    ordered.sort_by_key(|(path, _)| {
        registry
            .all_paths()
            .position(|known| known == path.as_str())
            .unwrap_or(usize::MAX)
    });
    ordered
}

/// Appends an additional-information block to `original`.
///
/// Always pass the unmodified brief; the block is rebuilt from scratch each
/// time.
pub fn merge_into_text(
    original: &str,
    answers: &Map<String, Value>,
    registry: &FieldRegistry,
) -> String {
    let accepted = accepted_answers(answers);
    if accepted.is_empty() {
        return original.to_string();
    }

    let mut text = original.trim_end().to_string();
    text.push_str("\n\n");
    text.push_str(ADDITIONAL_INFO_HEADER);
    for (path, value) in in_registry_order(&accepted, registry) {
        text.push('\n');
        text.push_str(&registry.display_name(path));
        text.push_str(": ");
        text.push_str(&display_value(value));
    }
    text
}

/// Human-readable rendering of an answer value; lists are comma-joined.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
