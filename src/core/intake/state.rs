use super::ledger::SessionLedger;
use super::merger::AnswerBatch;
use super::record::StructuredRecord;
use super::request::InfoRequest;
use super::scorer::ConfidenceResult;
use crate::error::SessionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HitlStatus {
    Pending,
    Completed,
    Skipped,
}

/// Everything one session owns. Serialized in full between turns; field
/// names are part of the persisted format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub session_id: String,
    pub original_brief: String,
    /// Original brief plus the rebuilt additional-information block.
    pub working_brief: String,
    pub record: Option<StructuredRecord>,
    pub status: HitlStatus,
    pub iteration_count: u32,
    pub max_iterations: u32,
    #[serde(default)]
    pub ledger: SessionLedger,
    /// Every request issued so far, oldest first.
    #[serde(default)]
    pub pending_requests: Vec<InfoRequest>,
    #[serde(default, alias = "last_parsed_human_message_id")]
    pub last_human_input_consumed_id: Option<String>,
    #[serde(default)]
    pub pending_answers: Option<AnswerBatch>,
    /// Cumulative answers consumed so far; later answers override earlier ones.
    #[serde(default)]
    pub collected_answers: Map<String, Value>,
    #[serde(default)]
    pub confidence: Option<ConfidenceResult>,
    #[serde(default)]
    pub requires_human_input: bool,
}

impl WorkflowState {
    pub fn new(session_id: impl Into<String>, brief: &str, max_iterations: u32) -> Self {
        Self {
            session_id: session_id.into(),
            original_brief: brief.to_string(),
            working_brief: brief.to_string(),
            record: None,
            status: HitlStatus::Pending,
            iteration_count: 0,
            max_iterations,
            ledger: SessionLedger::new(),
            pending_requests: Vec::new(),
            last_human_input_consumed_id: None,
            pending_answers: None,
            collected_answers: Map::new(),
            confidence: None,
            requires_human_input: false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, HitlStatus::Completed | HitlStatus::Skipped)
            || self.iteration_count >= self.max_iterations
    }

    pub fn latest_request(&self) -> Option<&InfoRequest> {
        self.pending_requests.last()
    }

    /// Whether `batch` has not been consumed by the previous merge.
    pub fn is_new_input(&self, batch: &AnswerBatch) -> bool {
        self.last_human_input_consumed_id.as_deref() != Some(batch.id.as_str())
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(session_id: &str, raw: &str) -> Result<Self, SessionError> {
        serde_json::from_str(raw).map_err(|err| SessionError::Corrupt {
            session_id: session_id.to_string(),
            message: err.to_string(),
        })
    }
}
