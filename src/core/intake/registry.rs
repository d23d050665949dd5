//! Static table of the brief fields the intake loop tracks.

use serde::Serialize;
use strum::Display;

/// How badly project scoping suffers when a field is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldPriority {
    Critical,
    Important,
    Optional,
}

/// One tracked field: where it lives in the record and how to ask for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Dotted path into the structured record, e.g. `business_brief.budget`.
    pub path: &'static str,
    /// Short display name used in the enhanced brief text.
    pub label: &'static str,
    pub description: &'static str,
    pub priority: FieldPriority,
    pub suggested_values: &'static [&'static str],
}

impl FieldSpec {
    pub fn is_critical(&self) -> bool {
        self.priority == FieldPriority::Critical
    }

    /// Record category (first path segment) this field belongs to.
    pub fn category(&self) -> &'static str {
        self.path.split('.').next().unwrap_or(self.path)
    }
}

const REFERENCE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        path: "business_brief.budget",
        label: "Budget",
        description: "Budget amount for the project",
        priority: FieldPriority::Critical,
        suggested_values: &["Under $5,000", "$5,000-$50,000", "Over $50,000", "TBD"],
    },
    FieldSpec {
        path: "business_brief.territory",
        label: "Territory",
        description: "Geographic territories where music will be used",
        priority: FieldPriority::Critical,
        suggested_values: &[
            "United States",
            "Germany",
            "United Kingdom",
            "Global",
            "Europe",
        ],
    },
    FieldSpec {
        path: "business_brief.media",
        label: "Media Usage",
        description: "Media channels where music will be used",
        priority: FieldPriority::Critical,
        suggested_values: &[
            "TV Commercial",
            "Online Video",
            "Radio",
            "Cinema",
            "Social Media",
        ],
    },
    FieldSpec {
        path: "business_brief.term",
        label: "License Term",
        description: "Duration of music license",
        priority: FieldPriority::Important,
        suggested_values: &["1 year", "2 years", "3 years", "In perpetuity", "TBD"],
    },
    FieldSpec {
        path: "creative_brief.genres",
        label: "Musical Genres",
        description: "Musical genres or styles needed",
        priority: FieldPriority::Important,
        suggested_values: &["Pop", "Rock", "Electronic", "Classical", "Hip-Hop", "Folk"],
    },
    FieldSpec {
        path: "deliverables.submission_deadline",
        label: "Submission Deadline",
        description: "When music submissions are due",
        priority: FieldPriority::Critical,
        suggested_values: &[],
    },
];

/// Read-only field table. Shared freely across sessions.
#[derive(Debug, Clone, Copy)]
pub struct FieldRegistry {
    fields: &'static [FieldSpec],
}

impl FieldRegistry {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    /// The music-licensing reference table.
    pub const fn reference() -> Self {
        Self::new(REFERENCE_FIELDS)
    }

    /// Spec for `path`, or `None` when the path is not tracked.
    pub fn describe(&self, path: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.path == path)
    }

    /// Tracked paths in declaration order.
    pub fn all_paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|spec| spec.path)
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn is_critical(&self, path: &str) -> bool {
        self.describe(path).is_some_and(FieldSpec::is_critical)
    }

    /// Human-readable name for `path`: the registered label, else the path
    /// title-cased with underscores as spaces.
    pub fn display_name(&self, path: &str) -> String {
        self.describe(path)
            .map_or_else(|| title_case(&path.replace('_', " ")), |spec| spec.label.to_string())
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::reference()
    }
}

/// Uppercases every letter that follows a non-letter, lowercases the rest.
fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_is_alpha = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if prev_is_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_alpha = true;
        } else {
            out.push(c);
            prev_is_alpha = false;
        }
    }
    out
}
