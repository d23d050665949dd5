use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartmetricConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// How long an issued access token is reused before refreshing.
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: u64,
}

fn default_base_url() -> String {
    "https://api.chartmetric.com".into()
}

fn default_token_ttl_minutes() -> u64 {
    55
}

impl Default for ChartmetricConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            refresh_token: None,
            token_ttl_minutes: default_token_ttl_minutes(),
        }
    }
}
