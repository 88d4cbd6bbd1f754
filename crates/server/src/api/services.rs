use axum::Json;
use axum::extract::{Query, State};
use tracing::info;

use pagerbridge_client::ServicesResponse;

use super::AppState;
use super::error::ApiError;
use super::schedules::PageParams;

const SERVICES_ERROR: &str = "api.pagerduty.services.error";

/// `GET /api/v1/services`
pub async fn list_services(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> Result<Json<ServicesResponse>, ApiError> {
    let config = state.config.snapshot().await;
    let client = state.client(&config)?;

    let services = client
        .get_services(page.limit, page.offset)
        .await
        .map_err(|e| ApiError::upstream(SERVICES_ERROR, "Failed to retrieve services", &e))?;

    info!(count = services.services.len(), "retrieved services");
    Ok(Json(services))
}
