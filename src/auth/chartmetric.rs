use super::token_cache::{AccessTokenCache, TokenSource};
use crate::config::ChartmetricConfig;
use crate::core::providers::{build_http_client_with_timeout, sanitize_api_error};
use crate::error::CredentialError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const TOKEN_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    refreshtoken: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

/// Exchanges a Chartmetric refresh token at `{base_url}/api/token`.
pub struct ChartmetricTokenSource {
    client: Client,
    token_url: String,
    refresh_token: String,
}

impl ChartmetricTokenSource {
    pub fn new(base_url: &str, refresh_token: impl Into<String>) -> Self {
        Self {
            client: build_http_client_with_timeout(TOKEN_TIMEOUT_SECS),
            token_url: format!("{}/api/token", base_url.trim_end_matches('/')),
            refresh_token: refresh_token.into(),
        }
    }

    pub fn from_config(config: &ChartmetricConfig) -> Result<Self, CredentialError> {
        let refresh_token = config
            .refresh_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| CredentialError::Missing("CHARTMETRIC_REFRESH_TOKEN".into()))?;
        Ok(Self::new(&config.base_url, refresh_token))
    }

    async fn exchange(&self) -> Result<String, CredentialError> {
        let response = self
            .client
            .post(&self.token_url)
            .json(&TokenRequest {
                refreshtoken: &self.refresh_token,
            })
            .send()
            .await
            .map_err(|err| CredentialError::Request(sanitize_api_error(&err.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                body: sanitize_api_error(&body),
            });
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|err| CredentialError::Request(format!("invalid token response: {err}")))?;
        parsed
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| CredentialError::Request("token response has no `token` field".into()))
    }
}

impl TokenSource for ChartmetricTokenSource {
    fn name(&self) -> &str {
        "chartmetric"
    }

    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<String, CredentialError>> + Send + '_>> {
        Box::pin(self.exchange())
    }
}

pub type ChartmetricTokenCache = AccessTokenCache<ChartmetricTokenSource>;

pub fn chartmetric_token_cache(
    config: &ChartmetricConfig,
) -> Result<ChartmetricTokenCache, CredentialError> {
    let source = ChartmetricTokenSource::from_config(config)?;
    Ok(AccessTokenCache::new(
        source,
        Duration::from_secs(config.token_ttl_minutes.saturating_mul(60)),
    ))
}
