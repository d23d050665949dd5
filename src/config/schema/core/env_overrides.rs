use super::Config;
use crate::config::schema::llm::{GROQ_BASE_URL, OPENAI_BASE_URL};

impl Config {
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides read through `lookup`; empty values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = var("GROQ_API_KEY") {
            self.llm.api_key = Some(key);
        } else if let Some(key) = var("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
            if self.llm.base_url == GROQ_BASE_URL && var("LLM_BASE_URL").is_none() {
                self.llm.provider_name = "openai".into();
                self.llm.base_url = OPENAI_BASE_URL.into();
            }
        }

        if let Some(base_url) = var("LLM_BASE_URL") {
            self.llm.base_url = base_url;
        }

        if let Some(model) = var("LLM_MODEL") {
            self.llm.model = model;
        }

        if let Some(token) = var("CHARTMETRIC_REFRESH_TOKEN") {
            self.chartmetric.refresh_token = Some(token);
        }

        if let Some(raw) = var("BRIEFLOOP_MAX_ITERATIONS")
            && let Ok(max) = raw.trim().parse::<u32>()
        {
            self.hitl.max_iterations = max;
        }

        if let Some(raw) = var("BRIEFLOOP_ACCEPTANCE_THRESHOLD")
            && let Ok(threshold) = raw.trim().parse::<f64>()
            && (0.0..=1.0).contains(&threshold)
        {
            self.hitl.acceptance_threshold = threshold;
        }
    }
}
