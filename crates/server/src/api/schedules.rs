use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use pagerbridge_client::{ScheduleDetail, SchedulesResponse};

use super::AppState;
use super::error::ApiError;

const SCHEDULES_ERROR: &str = "api.pagerduty.schedules.error";
const SCHEDULE_ERROR: &str = "api.pagerduty.schedule.error";
const SCHEDULE_ID_MISSING: &str = "api.pagerduty.schedule.id.missing";
const SCHEDULE_WINDOW_INVALID: &str = "api.pagerduty.schedule.window.invalid";

/// Query parameters for paged list endpoints.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    100
}

/// `GET /api/v1/schedules`
pub async fn list_schedules(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> Result<Json<SchedulesResponse>, ApiError> {
    let config = state.config.snapshot().await;
    let client = state.client(&config)?;

    debug!(limit = page.limit, offset = page.offset, "fetching schedules");
    let schedules = client
        .get_schedules(page.limit, page.offset)
        .await
        .map_err(|e| ApiError::upstream(SCHEDULES_ERROR, "Failed to retrieve schedules", &e))?;

    info!(count = schedules.schedules.len(), "retrieved schedules");

    if let Some(cache) = &state.cache {
        match serde_json::to_vec(&schedules) {
            Ok(blob) => {
                if let Err(e) = cache.set_cached_schedules(&blob).await {
                    warn!(error = %e, "failed to cache schedules");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode schedules for cache"),
        }
    }

    Ok(Json(schedules))
}

/// Query parameters for `GET /api/v1/schedule`.
///
/// The window starts at `since` (default now) and ends at `until`, or
/// `hours` after the start, or the configured default window.
#[derive(Debug, Deserialize)]
pub struct ScheduleParams {
    #[serde(default)]
    pub id: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub hours: Option<u32>,
}

/// `GET /api/v1/schedule`
pub async fn get_schedule(
    State(state): State<AppState>,
    Query(params): Query<ScheduleParams>,
) -> Result<Json<ScheduleDetail>, ApiError> {
    let config = state.config.snapshot().await;
    let client = state.client(&config)?;

    if params.id.is_empty() {
        warn!("schedule id missing in request");
        return Err(ApiError::bad_request(
            SCHEDULE_ID_MISSING,
            "Schedule ID is required",
        ));
    }

    let (since, until) = window(&params, Utc::now(), config.schedule.default_window())?;

    debug!(schedule_id = %params.id, %since, %until, "fetching schedule details");
    let schedule = client
        .get_schedule(&params.id, since, until)
        .await
        .map_err(|e| {
            ApiError::upstream(SCHEDULE_ERROR, "Failed to retrieve schedule details", &e)
        })?;

    info!(schedule_id = %params.id, name = %schedule.name, "retrieved schedule details");
    Ok(Json(schedule))
}

fn window(
    params: &ScheduleParams,
    now: DateTime<Utc>,
    default: TimeDelta,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    let since = match params.since.as_deref() {
        Some(raw) => parse_instant("since", raw)?,
        None => now,
    };
    let until = match (params.until.as_deref(), params.hours) {
        (Some(raw), _) => parse_instant("until", raw)?,
        (None, Some(hours)) => extend(since, TimeDelta::hours(i64::from(hours)))?,
        (None, None) => extend(since, default)?,
    };
    Ok((since, until))
}

fn extend(since: DateTime<Utc>, length: TimeDelta) -> Result<DateTime<Utc>, ApiError> {
    since.checked_add_signed(length).ok_or_else(|| {
        ApiError::bad_request(SCHEDULE_WINDOW_INVALID, "Schedule window is out of range")
    })
}

fn parse_instant(name: &str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| {
            ApiError::bad_request(
                SCHEDULE_WINDOW_INVALID,
                format!("'{name}' must be an RFC 3339 timestamp"),
            )
        })
}
