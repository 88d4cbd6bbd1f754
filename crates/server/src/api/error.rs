use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

/// JSON error body: `{"id": "...", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub id: &'static str,
    pub message: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    pub const CONFIG_INVALID: &'static str = "api.pagerduty.config.invalid";

    pub fn new(status: StatusCode, id: &'static str, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
            status,
        }
    }

    pub fn not_configured() -> Self {
        Self::new(
            StatusCode::NOT_IMPLEMENTED,
            Self::CONFIG_INVALID,
            "Plugin not configured",
        )
    }

    pub fn bad_request(id: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, id, message)
    }

    /// Map a failed client call to a response.
    ///
    /// `message` is shown for upstream failures; argument errors carry their
    /// own text.
    pub fn upstream(id: &'static str, message: &str, err: &pagerbridge_client::Error) -> Self {
        use pagerbridge_client::Error;

        match err {
            Error::Configuration(_) => Self::not_configured(),
            Error::InvalidRequest(_) => Self::bad_request(id, err.user_message()),
            _ => {
                error!(error = %err, id, "PagerDuty request failed");
                let status = if err.is_timeout() {
                    StatusCode::GATEWAY_TIMEOUT
                } else {
                    StatusCode::BAD_GATEWAY
                };
                Self::new(status, id, message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
