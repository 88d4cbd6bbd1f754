mod auth;
mod cache;
mod display;
mod pagerduty;
mod schedule;
mod server;
mod store;

#[cfg(test)]
mod tests;

pub use auth::*;
pub use cache::*;
pub use display::*;
pub use pagerduty::*;
pub use schedule::*;
pub use server::*;
pub use store::*;

use std::path::Path;

use serde::Deserialize;

use crate::error::ServerError;

/// Environment variable that overrides `pagerduty.api_token`.
pub const API_TOKEN_ENV: &str = "PAGERDUTY_API_TOKEN";

/// Top-level configuration, loaded from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// `PagerDuty` API credentials and endpoint.
    #[serde(default)]
    pub pagerduty: PagerDutyConfig,
    /// User-header authentication.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Text rendering settings.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Schedule detail defaults.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Schedule listing cache.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl PluginConfig {
    /// Load from `path`, or defaults when the file does not exist, then
    /// apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml(&contents)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ServerError> {
        toml::from_str(contents).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Apply overrides looked up through `lookup`. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(API_TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.pagerduty.set_api_token(token);
        }
    }

    /// Whether the configuration is usable for `PagerDuty` calls.
    pub fn validate(&self) -> Result<(), ServerError> {
        self.pagerduty.validate()
    }
}
