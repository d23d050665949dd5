use super::record::{StructuredRecord, is_missing_value};
use super::registry::FieldRegistry;
use serde::{Deserialize, Serialize};

/// Registry paths still unsatisfied, in registry declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissingFieldSet(Vec<String>);

impl MissingFieldSet {
    pub fn paths(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.iter().any(|p| p == path)
    }

    /// Missing paths whose registry priority is critical.
    pub fn critical<'a>(&'a self, registry: &'a FieldRegistry) -> impl Iterator<Item = &'a str> {
        self.0
            .iter()
            .map(String::as_str)
            .filter(move |path| registry.is_critical(path))
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<MissingFieldSet> for Vec<String> {
    fn from(set: MissingFieldSet) -> Self {
        set.0
    }
}

/// Walks a record against the registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingFieldDetector {
    registry: FieldRegistry,
}

impl MissingFieldDetector {
    pub fn new(registry: FieldRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn detect(&self, record: &StructuredRecord) -> MissingFieldSet {
        MissingFieldSet(
            self.registry
                .all_paths()
                .filter(|path| is_missing_value(record.get_path(path)))
                .map(str::to_string)
                .collect(),
        )
    }
}
