//! Bounded analyze → detect → ask → merge loop over one brief.
//!
//! The orchestrator owns no session state itself. Each call takes a
//! [`WorkflowState`], runs the transitions that apply, and hands the state
//! back together with a [`TurnOutcome`] for the host. The only suspension
//! point is a pending [`InfoRequest`]: the host answers it out of band and
//! calls [`HitlOrchestrator::continue_session`] with the answers.

use super::detector::MissingFieldDetector;
use super::ledger::SessionRecord;
use super::merger::{self, AnswerBatch};
use super::record::StructuredRecord;
use super::registry::FieldRegistry;
use super::request::InfoRequest;
use super::scorer::{ConfidenceResult, ConfidenceScorer, QualityReport, ReferenceScorer, assess};
use super::state::{HitlStatus, WorkflowState};
use super::traits::{BriefExtractor, HumanResponder};
use crate::error::{BriefError, SessionError};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

pub const DEFAULT_MAX_ITERATIONS: u32 = 3;
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitlPolicy {
    pub max_iterations: u32,
    pub acceptance_threshold: f64,
    /// Re-run extraction over the enhanced brief after each merge.
    pub reanalyze_enhanced_brief: bool,
}

impl Default for HitlPolicy {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            reanalyze_enhanced_brief: false,
        }
    }
}

/// Transition the engine takes next for a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Extract,
    MergeAnswers,
    Evaluate,
    AwaitHuman,
    Finished,
}

/// `needs_evaluation` is set after any transition that changed the record.
pub fn next_step(state: &WorkflowState, needs_evaluation: bool) -> NextStep {
    if matches!(state.status, HitlStatus::Completed | HitlStatus::Skipped) {
        NextStep::Finished
    } else if state.record.is_none() {
        NextStep::Extract
    } else if state.pending_answers.is_some() {
        NextStep::MergeAnswers
    } else if needs_evaluation {
        NextStep::Evaluate
    } else {
        NextStep::AwaitHuman
    }
}

/// What the host sees after a turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub session_id: String,
    pub status: HitlStatus,
    pub requires_human_input: bool,
    pub iteration_count: u32,
    pub info_request: Option<InfoRequest>,
    pub record: Option<StructuredRecord>,
    pub confidence: Option<ConfidenceResult>,
    pub quality: Option<QualityReport>,
}

/// Updated state plus the outcome derived from it.
#[derive(Debug, Clone)]
pub struct SessionTurn {
    pub state: WorkflowState,
    pub outcome: TurnOutcome,
}

pub struct HitlOrchestrator {
    extractor: Arc<dyn BriefExtractor>,
    scorer: Arc<dyn ConfidenceScorer>,
    registry: FieldRegistry,
    policy: HitlPolicy,
}

impl HitlOrchestrator {
    pub fn new(extractor: Arc<dyn BriefExtractor>) -> Self {
        Self {
            extractor,
            scorer: Arc::new(ReferenceScorer),
            registry: FieldRegistry::reference(),
            policy: HitlPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_scorer(mut self, scorer: Arc<dyn ConfidenceScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: FieldRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: HitlPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &HitlPolicy {
        &self.policy
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Extracts, scores, and either accepts the brief or issues the first
    /// request.
    pub async fn start_session(&self, brief: &str) -> Result<SessionTurn, BriefError> {
        let session_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            session_id = %session_id,
            extractor = self.extractor.name(),
            max_iterations = self.policy.max_iterations,
            "Starting brief intake session"
        );
        let mut state = WorkflowState::new(session_id, brief, self.policy.max_iterations);
        self.run(&mut state, false).await?;
        Ok(self.finish_turn(state))
    }

    /// Resumes a session from its full serialized state.
    ///
    /// Without new answers nothing is merged and the latest request is
    /// surfaced again. A batch whose id matches the last consumed one is
    /// ignored.
    pub async fn continue_session(
        &self,
        session_id: &str,
        mut state: WorkflowState,
        answers: Option<AnswerBatch>,
    ) -> Result<SessionTurn, BriefError> {
        if state.session_id != session_id {
            return Err(SessionError::Mismatch {
                expected: session_id.to_string(),
                actual: state.session_id,
            }
            .into());
        }

        if matches!(state.status, HitlStatus::Completed | HitlStatus::Skipped) {
            tracing::debug!(session_id, status = %state.status, "Session already finished");
            return Ok(self.finish_turn(state));
        }

        let budget_left = state.iteration_count < state.max_iterations;
        match answers {
            Some(batch) if !state.is_new_input(&batch) => {
                tracing::debug!(session_id, batch_id = %batch.id, "Answer batch already consumed");
            }
            Some(batch) if budget_left => state.pending_answers = Some(batch),
            Some(batch) => {
                tracing::warn!(
                    session_id,
                    batch_id = %batch.id,
                    "Iteration budget exhausted; answers not merged"
                );
            }
            None => {}
        }

        let retry_extraction = state.pending_answers.is_none()
            && state.iteration_count == 0
            && budget_left
            && state.record.as_ref().is_some_and(StructuredRecord::is_degraded);
        if retry_extraction {
            tracing::info!(session_id, "Retrying extraction after earlier failure");
            state.record = None;
        }

        let needs_evaluation = !budget_left;
        self.run(&mut state, needs_evaluation).await?;
        Ok(self.finish_turn(state))
    }

    /// Runs a whole session, asking `responder` whenever input is needed.
    pub async fn drive(
        &self,
        brief: &str,
        responder: &dyn HumanResponder,
    ) -> Result<SessionTurn, BriefError> {
        let mut turn = self.start_session(brief).await?;
        while turn.outcome.requires_human_input {
            let Some(request) = turn.state.latest_request() else {
                break;
            };
            let mut batch = responder.respond(request).await?;
            if !turn.state.is_new_input(&batch) {
                batch.id = format!("{}#{}", batch.id, turn.state.iteration_count + 1);
            }
            let session_id = turn.state.session_id.clone();
            turn = self
                .continue_session(&session_id, turn.state, Some(batch))
                .await?;
        }
        Ok(turn)
    }

    async fn run(
        &self,
        state: &mut WorkflowState,
        mut needs_evaluation: bool,
    ) -> Result<(), BriefError> {
        loop {
            match next_step(state, needs_evaluation) {
                NextStep::Extract => {
                    self.extract(state).await?;
                    needs_evaluation = true;
                }
                NextStep::MergeAnswers => {
                    self.merge_pending(state).await?;
                    needs_evaluation = true;
                }
                NextStep::Evaluate => {
                    self.evaluate(state);
                    needs_evaluation = false;
                }
                NextStep::AwaitHuman | NextStep::Finished => return Ok(()),
            }
        }
    }

    async fn analyze(&self, session_id: &str, text: &str) -> StructuredRecord {
        let extracted = self
            .extractor
            .extract(text)
            .await
            .and_then(StructuredRecord::from_value);
        match extracted {
            Ok(mut record) => {
                record.normalize();
                record.set_json_structure_valid(true);
                record.refresh_metrics();
                tracing::info!(session_id, "Brief extracted");
                record
            }
            Err(err) => {
                tracing::warn!(session_id, error = %err, "Extraction failed; using degraded record");
                let mut record = StructuredRecord::degraded(&err);
                record.refresh_metrics();
                record
            }
        }
    }

    async fn extract(&self, state: &mut WorkflowState) -> Result<(), BriefError> {
        let record = self.analyze(&state.session_id, &state.working_brief).await;
        self.record_iteration(state, record, None)
    }

    async fn merge_pending(&self, state: &mut WorkflowState) -> Result<(), BriefError> {
        let Some(batch) = state.pending_answers.take() else {
            return Ok(());
        };
        let Some(current) = state.record.as_ref() else {
            return Ok(());
        };

        let accepted = merger::accepted_answers(&batch.answers);
        for (path, value) in &accepted {
            state.collected_answers.insert(path.clone(), value.clone());
        }
        state.working_brief =
            merger::merge_into_text(&state.original_brief, &state.collected_answers, &self.registry);

        let mut record = merger::merge_into_record(current, &accepted, &self.registry);
        if self.policy.reanalyze_enhanced_brief {
            record = self.reanalyze(state, record).await;
        }

        state.iteration_count += 1;
        state.last_human_input_consumed_id = Some(batch.id.clone());
        tracing::info!(
            session_id = %state.session_id,
            batch_id = %batch.id,
            answers = accepted.len(),
            iteration_count = state.iteration_count,
            "Merged human answers"
        );
        self.record_iteration(state, record, Some(accepted))
    }

    /// Re-extracts the enhanced brief and re-applies every collected answer
    /// on top. Falls back to `merged` if extraction fails.
    async fn reanalyze(&self, state: &WorkflowState, merged: StructuredRecord) -> StructuredRecord {
        let fresh = self.analyze(&state.session_id, &state.working_brief).await;
        if fresh.is_degraded() {
            tracing::warn!(
                session_id = %state.session_id,
                "Re-analysis of enhanced brief failed; keeping merged record"
            );
            return merged;
        }
        merger::merge_into_record(&fresh, &state.collected_answers, &self.registry)
    }

    fn record_iteration(
        &self,
        state: &mut WorkflowState,
        record: StructuredRecord,
        human_input: Option<Map<String, Value>>,
    ) -> Result<(), BriefError> {
        let confidence = self.scorer.score(&record);
        let missing = MissingFieldDetector::new(self.registry).detect(&record);
        state.ledger.append(SessionRecord {
            session_id: state.session_id.clone(),
            iteration: state.ledger.next_iteration(),
            timestamp: Utc::now(),
            record_snapshot: record.clone(),
            confidence,
            missing_at_this_point: missing.into_vec(),
            human_input_this_iteration: human_input,
        })?;
        state.confidence = Some(confidence);
        state.record = Some(record);
        Ok(())
    }

    fn evaluate(&self, state: &mut WorkflowState) {
        let Some(record) = state.record.as_ref() else {
            return;
        };
        let confidence = self.scorer.score(record);
        let missing = MissingFieldDetector::new(self.registry).detect(record);
        let critical_missing = missing.critical(&self.registry).count();

        let budget_exhausted = state.iteration_count >= state.max_iterations;
        let accepted = confidence.score >= self.policy.acceptance_threshold;
        let nothing_critical = critical_missing == 0;
        state.confidence = Some(confidence);

        if budget_exhausted || accepted || nothing_critical {
            let never_asked = state.pending_requests.is_empty();
            state.status = if budget_exhausted && !accepted && !nothing_critical && never_asked {
                HitlStatus::Skipped
            } else {
                HitlStatus::Completed
            };
            state.requires_human_input = false;
            tracing::info!(
                session_id = %state.session_id,
                status = %state.status,
                score = confidence.score,
                level = %confidence.level,
                critical_missing,
                budget_exhausted,
                "Brief intake finished"
            );
        } else {
            let request = InfoRequest::build(&state.session_id, &missing, &self.registry);
            tracing::info!(
                session_id = %state.session_id,
                score = confidence.score,
                priority = %request.priority,
                missing = missing.len(),
                "Requesting human input"
            );
            state.status = HitlStatus::Pending;
            state.requires_human_input = true;
            state.pending_requests.push(request);
        }
    }

    fn finish_turn(&self, state: WorkflowState) -> SessionTurn {
        let outcome = TurnOutcome {
            session_id: state.session_id.clone(),
            status: state.status,
            requires_human_input: state.requires_human_input,
            iteration_count: state.iteration_count,
            info_request: state
                .requires_human_input
                .then(|| state.latest_request().cloned())
                .flatten(),
            record: state.record.clone(),
            confidence: state.confidence,
            quality: state
                .record
                .as_ref()
                .map(|record| assess(record, self.scorer.as_ref(), &self.registry)),
        };
        SessionTurn { state, outcome }
    }
}
