use axum::Json;
use axum::extract::State;
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Whether `PagerDuty` credentials are configured.
    pub configured: bool,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.config.snapshot().await;
    Json(HealthResponse {
        status: "ok",
        configured: config.validate().is_ok(),
    })
}
