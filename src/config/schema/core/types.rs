use super::super::{ChartmetricConfig, HitlConfig, LlmConfig};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (`~/.briefloop`) - computed from home, not serialized
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub hitl: HitlConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub chartmetric: ChartmetricConfig,

    /// Overrides `<data_dir>/sessions`.
    #[serde(default)]
    pub sessions_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".briefloop"),
            config_path: PathBuf::from(".briefloop/config.toml"),
            hitl: HitlConfig::default(),
            llm: LlmConfig::default(),
            chartmetric: ChartmetricConfig::default(),
            sessions_dir: None,
        }
    }
}

impl Config {
    pub fn sessions_dir(&self) -> PathBuf {
        self.sessions_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("sessions"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.hitl.acceptance_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Validation(format!(
                "hitl.acceptance_threshold must be within [0, 1], got {threshold}"
            )));
        }
        let temperature = self.llm.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::Validation(format!(
                "llm.temperature must be within [0, 2], got {temperature}"
            )));
        }
        if self.chartmetric.token_ttl_minutes == 0 {
            return Err(ConfigError::Validation(
                "chartmetric.token_ttl_minutes must be greater than 0".into(),
            ));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("llm.base_url must not be empty".into()));
        }
        Ok(())
    }
}
