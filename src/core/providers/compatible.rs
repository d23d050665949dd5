//! OpenAI-compatible chat completions client.
//! Groq, OpenAI and most hosted inference APIs accept the same
//! `/chat/completions` request shape.

use super::http_client::build_http_client_with_timeout;
use super::sanitize_api_error;
use super::traits::Provider;
use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

pub struct OpenAiCompatibleProvider {
    pub(crate) name: String,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    /// Pre-computed `Authorization` header value.
    cached_auth: Option<String>,
    cached_chat_url: String,
    json_mode: bool,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(name: &str, base_url: &str, api_key: Option<&str>, timeout_secs: u64) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let cached_chat_url = if base_url.ends_with("chat/completions") {
            base_url.clone()
        } else {
            format!("{base_url}/chat/completions")
        };
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(ToString::to_string);

        Self {
            name: name.to_string(),
            base_url,
            cached_auth: api_key.as_ref().map(|key| format!("Bearer {key}")),
            api_key,
            cached_chat_url,
            json_mode: false,
            client: build_http_client_with_timeout(timeout_secs),
        }
    }

    /// Ask the endpoint for a JSON object response (`response_format`).
    #[must_use]
    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }

    fn chat_completions_url(&self) -> &str {
        &self.cached_chat_url
    }

    fn apply_auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.cached_auth {
            Some(value) => req.header("Authorization", value),
            None => req,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_chat_text(response: ChatResponse, provider_name: &str) -> anyhow::Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("No response from {provider_name}"))
}

impl OpenAiCompatibleProvider {
    async fn call_chat_completions(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        let response = self
            .apply_auth_header(self.client.post(self.chat_completions_url()).json(request))
            .send()
            .await
            .with_context(|| format!("{} chat completions request failed", self.name))?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            let sanitized = sanitize_api_error(&error);
            anyhow::bail!("{} API error ({status}): {sanitized}", self.name);
        }

        response
            .json()
            .await
            .with_context(|| format!("{} chat completions JSON decode failed", self.name))
    }

    async fn chat_with_system_internal(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        if self.api_key.is_none() {
            anyhow::bail!(
                "{} API key not set. Set GROQ_API_KEY or OPENAI_API_KEY, or add llm.api_key to the config.",
                self.name
            );
        }

        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system_prompt {
            messages.push(Message {
                role: "system",
                content: sys.to_string(),
            });
        }
        messages.push(Message {
            role: "user",
            content: message.to_string(),
        });

        let request = ChatRequest {
            model: model.to_string(),
            messages,
            temperature,
            response_format: self.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let chat_response = self.call_chat_completions(&request).await?;
        if let Some(usage) = &chat_response.usage {
            tracing::debug!(
                provider = %self.name,
                model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion finished"
            );
        }
        extract_chat_text(chat_response, &self.name)
    }
}

impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn chat_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(self.chat_with_system_internal(system_prompt, message, model, temperature))
    }
}
