use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::info;

use pagerbridge_client::CreateIncidentResponse;

use crate::auth::UserId;

use super::AppState;
use super::error::ApiError;

const INCIDENT_ERROR: &str = "api.pagerduty.incident.error";
const INCIDENT_INVALID: &str = "api.pagerduty.incident.invalid";

/// Request body for opening an incident.
#[derive(Debug, Deserialize)]
pub struct CreateIncidentBody {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub assignee_ids: Vec<String>,
}

/// `POST /api/v1/incidents`
pub async fn create_incident(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<UserId>,
    body: Result<Json<CreateIncidentBody>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateIncidentResponse>), ApiError> {
    let config = state.config.snapshot().await;
    let client = state.client(&config)?;

    let Json(body) = body.map_err(|e| ApiError::bad_request(INCIDENT_INVALID, e.body_text()))?;

    let title = body.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request(INCIDENT_INVALID, "Title is required"));
    }
    if body.service_id.is_empty() {
        return Err(ApiError::bad_request(INCIDENT_INVALID, "Service ID is required"));
    }

    let created = client
        .create_incident(
            title,
            &body.description,
            &body.service_id,
            body.assignee_ids.as_slice(),
        )
        .await
        .map_err(|e| ApiError::upstream(INCIDENT_ERROR, "Failed to create incident", &e))?;

    info!(
        user_id = %user,
        incident_id = created.incident.id.as_deref().unwrap_or_default(),
        service_id = %body.service_id,
        "incident created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}
