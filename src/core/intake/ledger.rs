use super::record::StructuredRecord;
use super::scorer::ConfidenceResult;
use crate::error::SessionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One audited iteration. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    /// 1-based, strictly increasing within a ledger.
    pub iteration: u32,
    pub timestamp: DateTime<Utc>,
    pub record_snapshot: StructuredRecord,
    pub confidence: ConfidenceResult,
    pub missing_at_this_point: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_input_this_iteration: Option<Map<String, Value>>,
}

/// Append-only audit trail of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionLedger(Vec<SessionRecord>);

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iteration number the next appended entry must carry.
    pub fn next_iteration(&self) -> u32 {
        u32::try_from(self.0.len()).map_or(u32::MAX, |len| len.saturating_add(1))
    }

    pub fn append(&mut self, entry: SessionRecord) -> Result<(), SessionError> {
        let expected = self.next_iteration();
        if entry.iteration != expected {
            return Err(SessionError::OutOfOrder {
                expected,
                actual: entry.iteration,
            });
        }
        self.0.push(entry);
        Ok(())
    }

    pub fn all(&self) -> &[SessionRecord] {
        &self.0
    }

    pub fn latest(&self) -> Option<&SessionRecord> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
