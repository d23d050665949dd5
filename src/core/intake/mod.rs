pub mod detector;
pub mod ledger;
pub mod merger;
pub mod orchestrator;
pub mod record;
pub mod registry;
pub mod request;
pub mod scorer;
pub mod state;
pub mod traits;

pub use detector::{MissingFieldDetector, MissingFieldSet};
pub use ledger::{SessionLedger, SessionRecord};
pub use merger::{AnswerBatch, merge_into_record, merge_into_text};
pub use orchestrator::{HitlOrchestrator, HitlPolicy, NextStep, SessionTurn, TurnOutcome};
pub use record::{ExtractionMetrics, StructuredRecord};
pub use registry::{FieldPriority, FieldRegistry, FieldSpec};
pub use request::{InfoRequest, RequestPriority};
pub use scorer::{
    ConfidenceLevel, ConfidenceResult, ConfidenceScorer, QualityReport, ReferenceScorer, assess,
};
pub use state::{HitlStatus, WorkflowState};
pub use traits::{BriefExtractor, HumanResponder};
