use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::{debug, info};

use pagerbridge_client::OnCallsResponse;

use super::AppState;
use super::error::ApiError;

const ONCALLS_ERROR: &str = "api.pagerduty.oncalls.error";

#[derive(Debug, Deserialize)]
pub struct OnCallParams {
    pub schedule_id: Option<String>,
}

/// `GET /api/v1/oncalls`
///
/// Scoped to one schedule when `schedule_id` is given, otherwise every
/// current on-call.
pub async fn list_on_calls(
    State(state): State<AppState>,
    Query(params): Query<OnCallParams>,
) -> Result<Json<OnCallsResponse>, ApiError> {
    let config = state.config.snapshot().await;
    let client = state.client(&config)?;

    let result = match params.schedule_id.as_deref().filter(|id| !id.is_empty()) {
        Some(schedule_id) => {
            debug!(schedule_id, "fetching on-calls for schedule");
            client.get_on_calls_for_schedule(schedule_id).await
        }
        None => {
            debug!("fetching current on-calls for all schedules");
            client.get_current_on_calls().await
        }
    };

    let on_calls = result
        .map_err(|e| ApiError::upstream(ONCALLS_ERROR, "Failed to retrieve on-call users", &e))?;

    info!(count = on_calls.on_calls.len(), "retrieved on-calls");
    Ok(Json(on_calls))
}
