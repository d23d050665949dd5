#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value, json};

use briefloop::core::intake::{
    AnswerBatch, BriefExtractor, HitlOrchestrator, HitlPolicy, HumanResponder, InfoRequest,
};
use briefloop::error::ExtractionError;

/// Extractor that replays queued results, then repeats a fallback value.
pub struct ScriptedExtractor {
    responses: Mutex<VecDeque<Result<Value, ExtractionError>>>,
    fallback: Value,
    seen: Mutex<Vec<String>>,
}

impl ScriptedExtractor {
    pub fn repeating(value: Value) -> Self {
        Self::scripted(Vec::new(), value)
    }

    pub fn scripted(responses: Vec<Result<Value, ExtractionError>>, fallback: Value) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fallback,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Every text handed to `extract`, in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl BriefExtractor for ScriptedExtractor {
    fn name(&self) -> &str {
        "scripted"
    }

    fn extract<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ExtractionError>> + Send + 'a>> {
        Box::pin(async move {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(text.to_string());
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| Ok(self.fallback.clone()))
        })
    }
}

/// Responder that replays queued answer maps, then answers with nothing.
pub struct ScriptedResponder {
    answers: Mutex<VecDeque<Map<String, Value>>>,
    calls: AtomicUsize,
}

impl ScriptedResponder {
    pub fn new(answers: Vec<Value>) -> Self {
        let answers = answers
            .into_iter()
            .map(|value| match value {
                Value::Object(map) => map,
                other => panic!("scripted answers must be objects, got {other}"),
            })
            .collect();
        Self {
            answers: Mutex::new(answers),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn silent() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HumanResponder for ScriptedResponder {
    fn respond<'a>(
        &'a self,
        _request: &'a InfoRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<AnswerBatch>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let answers = self
                .answers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_default();
            Ok(AnswerBatch::new(answers))
        })
    }
}

pub fn engine(extractor: ScriptedExtractor) -> HitlOrchestrator {
    HitlOrchestrator::new(Arc::new(extractor))
}

pub fn engine_with_budget(extractor: ScriptedExtractor, max_iterations: u32) -> HitlOrchestrator {
    engine(extractor).with_policy(HitlPolicy {
        max_iterations,
        ..HitlPolicy::default()
    })
}

pub fn batch(id: &str, value: Value) -> AnswerBatch {
    let Value::Object(map) = value else {
        panic!("answers must be an object");
    };
    AnswerBatch::with_id(id, map)
}

/// Client and agency only: scores 0.3 and misses every critical field.
pub fn incomplete_brief() -> Value {
    json!({
        "extraction_status": "partial",
        "business_brief": {"client": "Nordlicht Bank", "agency": "Kreativhaus"},
        "creative_brief": {"descriptions": "warm, hopeful"}
    })
}

pub fn complete_brief() -> Value {
    json!({
        "extraction_status": "complete",
        "brief_quality": "excellent",
        "business_brief": {
            "client": "Nordlicht Bank",
            "agency": "Kreativhaus",
            "brand": "Nordlicht",
            "budget": "50000-75000 EUR",
            "territory": ["Germany", "Austria"],
            "media": ["TV", "Online"],
            "term": "12 months"
        },
        "creative_brief": {
            "genres": ["Indie Pop"],
            "mood": "uplifting",
            "enhanced_interpretation": {"mood_descriptors": ["hopeful", "bright"]}
        },
        "deliverables": {"submission_deadline": "2025-03-14"}
    })
}
