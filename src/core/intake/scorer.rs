use super::detector::MissingFieldDetector;
use super::record::StructuredRecord;
use super::registry::FieldRegistry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

const STRUCTURE_WEIGHT: f64 = 0.20;
const COMPLETION_WEIGHT: f64 = 0.30;
const CRITICAL_SUCCESS_WEIGHT: f64 = 0.25;
const INTERPRETATION_GOOD_WEIGHT: f64 = 0.25;
const INTERPRETATION_FAIR_WEIGHT: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConfidenceLevel {
    VeryLow,
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::High
        } else if score >= 0.6 {
            Self::Medium
        } else if score >= 0.4 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub score: f64,
    pub level: ConfidenceLevel,
}

impl ConfidenceResult {
    pub fn from_score(score: f64) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        Self {
            score,
            level: ConfidenceLevel::from_score(score),
        }
    }
}

/// Maps a record to a confidence in `[0, 1]`.
///
/// Implementations must be monotonic: populating more critical fields never
/// lowers the score when everything else is held fixed.
pub trait ConfidenceScorer: Send + Sync {
    fn name(&self) -> &str;

    fn score(&self, record: &StructuredRecord) -> ConfidenceResult;
}

/// Completion signals the reference policy reads from a record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreSignals {
    pub structure_valid: bool,
    pub completion_rate: f64,
    pub critical_field_success: bool,
    pub interpretation_quality: Option<String>,
}

impl ScoreSignals {
    /// Reads the top-level `json_structure_valid` flag and the embedded
    /// `extraction_metrics`. Absent signals count as zero.
    pub fn from_record(record: &StructuredRecord) -> Self {
        let metrics = record.get("extraction_metrics").and_then(Value::as_object);
        let metric = |key: &str| metrics.and_then(|m| m.get(key));
        Self {
            structure_valid: record.json_structure_valid(),
            completion_rate: metric("completion_rate")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            critical_field_success: metric("critical_field_success")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            interpretation_quality: metric("enhanced_interpretation_quality")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// Weighted-sum policy: 0.20 structure, 0.30 x completion, 0.25 critical
/// success, 0.25/0.15 interpretation quality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceScorer;

impl ReferenceScorer {
    pub fn score_signals(signals: &ScoreSignals) -> ConfidenceResult {
        let mut score = 0.0;
        if signals.structure_valid {
            score += STRUCTURE_WEIGHT;
        }

        let rate = if signals.completion_rate.is_finite() {
            signals.completion_rate.clamp(0.0, 100.0)
        } else {
            0.0
        };
        score += COMPLETION_WEIGHT * (rate / 100.0);

        if signals.critical_field_success {
            score += CRITICAL_SUCCESS_WEIGHT;
        }

        score += match signals.interpretation_quality.as_deref() {
            Some("good") => INTERPRETATION_GOOD_WEIGHT,
            Some("fair") => INTERPRETATION_FAIR_WEIGHT,
            _ => 0.0,
        };

        ConfidenceResult::from_score(score)
    }
}

impl ConfidenceScorer for ReferenceScorer {
    fn name(&self) -> &str {
        "reference"
    }

    fn score(&self, record: &StructuredRecord) -> ConfidenceResult {
        Self::score_signals(&ScoreSignals::from_record(record))
    }
}

/// Summary attached to every turn outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub confidence_score: f64,
    pub confidence_level: ConfidenceLevel,
    pub missing_fields_count: usize,
    pub critical_missing_count: usize,
    pub analysis_complete: bool,
    pub production_ready: bool,
}

pub fn assess(
    record: &StructuredRecord,
    scorer: &dyn ConfidenceScorer,
    registry: &FieldRegistry,
) -> QualityReport {
    let confidence = scorer.score(record);
    let missing = MissingFieldDetector::new(*registry).detect(record);
    let critical_missing_count = missing.critical(registry).count();
    QualityReport {
        confidence_score: confidence.score,
        confidence_level: confidence.level,
        missing_fields_count: missing.len(),
        critical_missing_count,
        analysis_complete: !record.is_degraded(),
        production_ready: confidence.score >= 0.8 && critical_missing_count == 0,
    }
}
