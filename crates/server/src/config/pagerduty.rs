use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ServerError;

/// `PagerDuty` API credentials and endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PagerDutyConfig {
    /// REST API token. Required for every `PagerDuty` call.
    #[serde(default = "default_api_token")]
    pub api_token: SecretString,
    /// API base URL. Empty selects the public endpoint.
    #[serde(default)]
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for PagerDutyConfig {
    fn default() -> Self {
        Self {
            api_token: default_api_token(),
            api_base_url: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl PagerDutyConfig {
    pub fn set_api_token(&mut self, token: String) {
        self.api_token = SecretString::new(token);
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.api_token.expose_secret().trim().is_empty() {
            return Err(ServerError::Config("API token is required".into()));
        }
        Ok(())
    }
}

fn default_api_token() -> SecretString {
    SecretString::new(String::new())
}

fn default_timeout() -> u64 {
    30
}
