pub mod cleanup;
pub mod prompt;

pub use cleanup::clean_json_response;

use crate::config::LlmConfig;
use crate::core::intake::BriefExtractor;
use crate::core::providers::{OpenAiCompatibleProvider, Provider, sanitize_api_error};
use crate::error::ExtractionError;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// [`BriefExtractor`] backed by a chat-completion provider.
pub struct LlmBriefExtractor {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f64,
}

impl LlmBriefExtractor {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f64) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        let provider = OpenAiCompatibleProvider::new(
            &config.provider_name,
            &config.base_url,
            config.api_key.as_deref(),
            config.timeout_secs,
        )
        .with_json_mode(config.json_mode);
        Self::new(Arc::new(provider), config.model.clone(), config.temperature)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn run(&self, text: &str) -> Result<Value, ExtractionError> {
        let raw = self
            .provider
            .chat_with_system(
                Some(prompt::BRIEF_EXTRACTION_PROMPT),
                &prompt::user_message(text),
                &self.model,
                self.temperature,
            )
            .await
            .map_err(|err| ExtractionError::Failed(sanitize_api_error(&format!("{err:#}"))))?;

        parse_extraction(&raw)
    }
}

/// Cleans model output and parses it as a JSON object.
pub fn parse_extraction(raw: &str) -> Result<Value, ExtractionError> {
    let cleaned = clean_json_response(raw);
    let value: Value =
        serde_json::from_str(&cleaned).map_err(|err| ExtractionError::Unparsable {
            message: err.to_string(),
            raw_output: raw.to_string(),
        })?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ExtractionError::NotAnObject)
    }
}

impl BriefExtractor for LlmBriefExtractor {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn extract<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ExtractionError>> + Send + 'a>> {
        Box::pin(async move {
            tracing::debug!(
                provider = self.provider.name(),
                model = %self.model,
                chars = text.len(),
                "Extracting brief"
            );
            self.run(text).await
        })
    }
}
