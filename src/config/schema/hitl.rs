use crate::core::intake::HitlPolicy;
use crate::core::intake::orchestrator::{DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_MAX_ITERATIONS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitlConfig {
    /// Answer batches a session may consume before it is closed.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Confidence at or above which a brief is accepted.
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f64,
    #[serde(default)]
    pub reanalyze_enhanced_brief: bool,
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

fn default_acceptance_threshold() -> f64 {
    DEFAULT_ACCEPTANCE_THRESHOLD
}

impl Default for HitlConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            acceptance_threshold: default_acceptance_threshold(),
            reanalyze_enhanced_brief: false,
        }
    }
}

impl HitlConfig {
    pub fn policy(&self) -> HitlPolicy {
        HitlPolicy {
            max_iterations: self.max_iterations,
            acceptance_threshold: self.acceptance_threshold,
            reanalyze_enhanced_brief: self.reanalyze_enhanced_brief,
        }
    }
}
