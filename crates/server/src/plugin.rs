//! Activation and deactivation.

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::HeaderName;
use tracing::{info, warn};

use pagerbridge_client::{ReqwestTransport, Transport};
use pagerbridge_kvstore::ScheduleCache;
use pagerbridge_kvstore_memory::MemoryKvStore;

use crate::api::AppState;
use crate::config::ConfigStore;
use crate::error::ServerError;

/// An activated plugin: the state every handler shares.
pub struct Plugin {
    state: AppState,
}

impl Plugin {
    /// Activate with the production transport.
    ///
    /// The request timeout is read once here; reloads do not change it.
    pub async fn activate(config: Arc<ConfigStore>) -> Result<Self, ServerError> {
        let timeout = Duration::from_secs(config.snapshot().await.pagerduty.timeout_seconds);
        let transport = ReqwestTransport::new(timeout)
            .map_err(|e| ServerError::Activation(format!("failed to build HTTP transport: {e}")))?;
        Self::activate_with_transport(config, Arc::new(transport)).await
    }

    /// Activate with a caller-supplied transport.
    ///
    /// Fails when no site URL is configured. Missing `PagerDuty`
    /// credentials are only logged: the API answers 501 until they are set.
    pub async fn activate_with_transport(
        config: Arc<ConfigStore>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ServerError> {
        info!("PagerDuty plugin activating");
        let snapshot = config.snapshot().await;

        let site_url = snapshot
            .server
            .site_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ServerError::Activation("site URL is not configured".into()))?;
        info!(url = %site_url, "site URL configured");

        match snapshot.validate() {
            Ok(()) => info!(
                base_url = %snapshot.pagerduty.api_base_url,
                "plugin configuration is valid"
            ),
            Err(e) => warn!(error = %e, "plugin configuration is not valid"),
        }

        let user_header = HeaderName::try_from(snapshot.auth.user_header.as_str())
            .map_err(|e| ServerError::Config(format!("invalid auth.user_header: {e}")))?;

        let cache = snapshot.cache.enabled.then(|| {
            ScheduleCache::new(Arc::new(MemoryKvStore::new()), snapshot.cache.ttl())
        });

        let registration = pagerbridge_command::registration();
        info!(trigger = %registration.trigger, "slash command available");

        let state = AppState {
            config,
            transport,
            cache,
            user_header,
        };

        info!("PagerDuty plugin activated");
        Ok(Self { state })
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.state.config
    }

    pub fn deactivate(self) {
        info!("PagerDuty plugin deactivating");
    }
}
