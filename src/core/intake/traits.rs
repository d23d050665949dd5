use super::merger::AnswerBatch;
use super::request::InfoRequest;
use crate::error::ExtractionError;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// Turns free brief text into a JSON object. May be slow or fail; the
/// orchestrator degrades every failure into a flagged record.
pub trait BriefExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn extract<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ExtractionError>> + Send + 'a>>;
}

/// Answers an information request, typically by asking a person.
pub trait HumanResponder: Send + Sync {
    fn respond<'a>(
        &'a self,
        request: &'a InfoRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<AnswerBatch>> + Send + 'a>>;
}
