use super::detector::MissingFieldSet;
use super::registry::FieldRegistry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::Display;

/// Urgency of a clarification request, derived from how many critical
/// fields it asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestPriority {
    Critical,
    Important,
    Optional,
}

impl RequestPriority {
    fn from_critical_count(count: usize) -> Self {
        match count {
            0 => Self::Optional,
            1 => Self::Important,
            _ => Self::Critical,
        }
    }
}

/// Structured request for the human responder. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoRequest {
    pub session_id: String,
    pub missing_fields: Vec<String>,
    pub field_descriptions: BTreeMap<String, String>,
    pub priority: RequestPriority,
    pub suggested_values: BTreeMap<String, Vec<String>>,
    pub request_message: String,
    pub created_at: DateTime<Utc>,
}

impl InfoRequest {
    pub fn build(session_id: &str, missing: &MissingFieldSet, registry: &FieldRegistry) -> Self {
        let mut field_descriptions = BTreeMap::new();
        let mut suggested_values = BTreeMap::new();
        let mut critical_count = 0;
        for path in missing.paths() {
            let Some(spec) = registry.describe(path) else {
                continue;
            };
            field_descriptions.insert(path.clone(), spec.description.to_string());
            suggested_values.insert(
                path.clone(),
                spec.suggested_values.iter().map(ToString::to_string).collect(),
            );
            if spec.is_critical() {
                critical_count += 1;
            }
        }

        let priority = RequestPriority::from_critical_count(critical_count);
        Self {
            session_id: session_id.to_string(),
            missing_fields: missing.paths().to_vec(),
            field_descriptions,
            priority,
            suggested_values,
            request_message: request_message(missing, registry, priority),
            created_at: Utc::now(),
        }
    }

    pub fn describe(&self, path: &str) -> Option<&str> {
        self.field_descriptions.get(path).map(String::as_str)
    }

    pub fn suggestions(&self, path: &str) -> &[String] {
        self.suggested_values.get(path).map_or(&[], Vec::as_slice)
    }
}

fn request_message(
    missing: &MissingFieldSet,
    registry: &FieldRegistry,
    priority: RequestPriority,
) -> String {
    let mut names: Vec<String> = missing
        .paths()
        .iter()
        .filter_map(|path| registry.describe(path))
        .map(|spec| spec.description.to_lowercase())
        .collect();
    if names.is_empty() {
        names = missing
            .paths()
            .iter()
            .map(|path| path.replace('_', " ").to_lowercase())
            .collect();
    }
    let joined = names.join(", ");

    match priority {
        RequestPriority::Critical => format!(
            "To provide the best music recommendations, we need some additional information: \
             {joined}. This information is critical for accurate project scoping."
        ),
        RequestPriority::Important => format!(
            "We found most of the key details, but could use clarification on: {joined}. \
             This will help us provide more targeted recommendations."
        ),
        RequestPriority::Optional => format!(
            "Optional: If available, additional details on {joined} would help refine our \
             recommendations."
        ),
    }
}
