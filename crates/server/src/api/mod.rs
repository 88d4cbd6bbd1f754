pub mod command;
pub mod error;
pub mod health;
pub mod incidents;
pub mod oncalls;
pub mod schedules;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::http::header::HeaderName;
use axum::routing::{get, post};
use secrecy::ExposeSecret;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use pagerbridge_client::{PagerDutyClient, Transport};
use pagerbridge_kvstore::ScheduleCache;

use crate::auth::UserHeaderLayer;
use crate::config::{ConfigStore, PluginConfig};

use self::error::ApiError;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Active configuration. Each request takes one snapshot.
    pub config: Arc<ConfigStore>,
    /// Transport shared by every per-request client.
    pub transport: Arc<dyn Transport>,
    /// Schedule listing cache (None when disabled).
    pub cache: Option<ScheduleCache>,
    /// Header carrying the host's user id.
    pub user_header: HeaderName,
}

impl AppState {
    /// Build a client from `config`, or a 501 when it is not usable.
    pub fn client(&self, config: &PluginConfig) -> Result<PagerDutyClient, ApiError> {
        if let Err(e) = config.validate() {
            warn!(error = %e, "plugin configuration invalid");
            return Err(ApiError::not_configured());
        }

        PagerDutyClient::builder(config.pagerduty.api_token.expose_secret())
            .base_url(config.pagerduty.api_base_url.as_str())
            .transport(Arc::clone(&self.transport))
            .build()
            .map_err(|e| {
                warn!(error = %e, "failed to build PagerDuty client");
                ApiError::not_configured()
            })
    }
}

/// Build the Axum router with all API routes and middleware.
pub fn router(state: AppState) -> Router {
    let public = Router::new().route("/health", get(health::health));

    let protected = Router::new()
        .route("/api/v1/schedules", get(schedules::list_schedules))
        .route("/api/v1/schedule", get(schedules::get_schedule))
        .route("/api/v1/oncalls", get(oncalls::list_on_calls))
        .route("/api/v1/services", get(services::list_services))
        .route("/api/v1/incidents", post(incidents::create_incident))
        .route("/api/v1/command", post(command::execute))
        .route("/api/v1/command/autocomplete", get(command::autocomplete))
        .layer(UserHeaderLayer::new(state.user_header.clone()));

    public
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
