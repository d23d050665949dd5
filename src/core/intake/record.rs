//! The structured brief record and the engine-side post-processing applied to
//! whatever the extraction capability returns.

use crate::error::ExtractionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Brief categories every normalized record carries.
pub const CATEGORIES: [&str; 6] = [
    "business_brief",
    "creative_brief",
    "contextual_brief",
    "technical_brief",
    "deliverables",
    "competitive_brief",
];

const BUSINESS_LIST_FIELDS: [&str; 6] = ["media", "territory", "lengths", "cutdowns", "extras", "options"];
const BUSINESS_SCALAR_FIELDS: [&str; 6] = ["client", "agency", "brand", "term", "scripts", "budget"];
const CREATIVE_LIST_FIELDS: [&str; 4] = ["keywords", "reference_tracks", "instruments", "genres"];
const CREATIVE_SCALAR_FIELDS: [&str; 5] = [
    "descriptions",
    "lyrics_requirements",
    "structure",
    "storyboard",
    "mood",
];
const INTERPRETATION_LIST_FIELDS: [&str; 3] =
    ["search_keywords", "mood_descriptors", "genre_suggestions"];

const METRIC_BUSINESS_FIELDS: [&str; 6] = ["client", "agency", "brand", "budget", "territory", "media"];
const METRIC_CREATIVE_FIELDS: [&str; 4] = ["keywords", "genres", "mood", "reference_tracks"];
const CRITICAL_CHECKLIST_SIZE: u32 = 6;

pub const STATUS_FAILED: &str = "failed";
pub const STATUS_ENHANCED: &str = "enhanced";

/// Nested mapping keyed by brief category, then field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredRecord(Map<String, Value>);

/// Treats an absent key, `null`, an empty list or a blank string as missing.
pub fn is_missing_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

impl StructuredRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Accepts only JSON objects; anything else is not a record.
    pub fn from_value(value: Value) -> Result<Self, ExtractionError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ExtractionError::NotAnObject),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Resolves a dotted path by sequential key lookups. Indexing into a
    /// non-mapping node resolves to `None`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Sets the leaf at `path`, creating intermediate mappings. An
    /// intermediate node that is not a mapping is replaced by a fresh one.
    pub fn set_path(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((leaf, parents)) = segments.split_last() else {
            return;
        };
        let mut current = &mut self.0;
        for segment in parents {
            let slot = current
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(next) = slot else {
                return;
            };
            current = next;
        }
        current.insert((*leaf).to_string(), value);
    }

    pub fn extraction_status(&self) -> Option<&str> {
        self.0.get("extraction_status").and_then(Value::as_str)
    }

    pub fn extraction_notes(&self) -> &str {
        self.0
            .get("extraction_notes")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// True for the placeholder record produced after an extraction failure.
    pub fn is_degraded(&self) -> bool {
        self.extraction_status() == Some(STATUS_FAILED)
    }

    pub fn json_structure_valid(&self) -> bool {
        self.0
            .get("json_structure_valid")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn set_json_structure_valid(&mut self, valid: bool) {
        self.0
            .insert("json_structure_valid".into(), Value::Bool(valid));
    }

    /// Fills in every category and the documented default fields without
    /// touching values that are already present.
    pub fn normalize(&mut self) {
        for category in CATEGORIES {
            let slot = self
                .0
                .entry(category.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
        }

        if let Some(Value::Object(business)) = self.0.get_mut("business_brief") {
            fill_defaults(business, &BUSINESS_LIST_FIELDS, &BUSINESS_SCALAR_FIELDS);
        }

        if let Some(Value::Object(creative)) = self.0.get_mut("creative_brief") {
            fill_defaults(creative, &CREATIVE_LIST_FIELDS, &CREATIVE_SCALAR_FIELDS);
            let interpretation = creative
                .entry("enhanced_interpretation".to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !interpretation.is_object() {
                *interpretation = Value::Object(Map::new());
            }
            if let Value::Object(interpretation) = interpretation {
                fill_defaults(
                    interpretation,
                    &INTERPRETATION_LIST_FIELDS,
                    &["reference_analysis"],
                );
            }
        }

        self.default_field("extraction_status", json!("partial"));
        self.default_field("brief_quality", json!("poor"));
        self.default_field("missing_information", json!([]));
        self.default_field("extraction_notes", json!(""));
    }

    fn default_field(&mut self, key: &str, value: Value) {
        self.0.entry(key.to_string()).or_insert(value);
    }

    /// Empty but well-typed record standing in for a failed extraction.
    pub fn degraded(error: &ExtractionError) -> Self {
        let message = error.to_string();
        let mut record = Self::new();
        record.insert("extraction_status", json!(STATUS_FAILED));
        record.insert("brief_quality", json!("poor"));
        record.insert(
            "missing_information",
            json!([
                "Unable to parse brief automatically",
                format!("Parsing error: {message}"),
            ]),
        );
        record.insert(
            "extraction_notes",
            json!(format!(
                "Automatic extraction failed. Manual review required. Error: {message}"
            )),
        );
        record.insert("error", json!(message));
        if let Some(raw) = error.raw_output() {
            record.insert("raw_output", json!(raw));
        }
        record.normalize();
        record.set_json_structure_valid(false);
        record
    }

    /// Recomputes and embeds `extraction_metrics` from the current contents.
    pub fn refresh_metrics(&mut self) -> ExtractionMetrics {
        let metrics = ExtractionMetrics::compute(self);
        if let Ok(value) = serde_json::to_value(&metrics) {
            self.0.insert("extraction_metrics".into(), value);
        }
        metrics
    }
}

fn fill_defaults(map: &mut Map<String, Value>, lists: &[&str], scalars: &[&str]) {
    for key in lists {
        map.entry((*key).to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
    }
    for key in scalars {
        map.entry((*key).to_string()).or_insert(Value::Null);
    }
}

/// Completion signals embedded in the record for the confidence scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetrics {
    pub business_fields_extracted: u32,
    pub creative_fields_extracted: u32,
    pub enhanced_interpretation_quality: String,
    pub completion_rate: f64,
    pub critical_field_success: bool,
    pub production_ready: bool,
}

impl ExtractionMetrics {
    pub fn compute(record: &StructuredRecord) -> Self {
        let populated = |category: &str, fields: &[&str]| -> u32 {
            let count = fields
                .iter()
                .filter(|field| !is_missing_value(record.get_path(&format!("{category}.{field}"))))
                .count();
            u32::try_from(count).unwrap_or(u32::MAX)
        };

        let business = populated("business_brief", &METRIC_BUSINESS_FIELDS);
        let creative = populated("creative_brief", &METRIC_CREATIVE_FIELDS);
        let interpretation = populated(
            "creative_brief.enhanced_interpretation",
            &INTERPRETATION_LIST_FIELDS,
        );

        let extracted = business + u32::from(creative > 0);
        let capped = extracted.min(CRITICAL_CHECKLIST_SIZE);
        let completion_rate =
            (f64::from(capped) / f64::from(CRITICAL_CHECKLIST_SIZE) * 1000.0).round() / 10.0;

        Self {
            business_fields_extracted: business,
            creative_fields_extracted: creative,
            enhanced_interpretation_quality: (if interpretation > 0 { "good" } else { "poor" })
                .to_string(),
            completion_rate,
            critical_field_success: extracted >= 3,
            production_ready: completion_rate >= 70.0
                && record.json_structure_valid()
                && record.extraction_status() == Some("complete"),
        }
    }
}
