use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use tracing::debug;

use pagerbridge_client::{Error, OnCallsResponse, SchedulesResponse};
use pagerbridge_command::{CommandHandler, CommandRegistration, CommandResponse, OnCallSource};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct CommandBody {
    pub command: String,
}

/// Stands in for `PagerDuty` while the plugin is unconfigured, so `help`
/// still works and data subcommands explain what is missing.
struct Unconfigured;

#[async_trait]
impl OnCallSource for Unconfigured {
    async fn schedules(&self) -> Result<SchedulesResponse, Error> {
        Err(Error::Configuration("API token is required".into()))
    }

    async fn current_on_calls(&self) -> Result<OnCallsResponse, Error> {
        Err(Error::Configuration("API token is required".into()))
    }
}

/// `POST /api/v1/command`
pub async fn execute(
    State(state): State<AppState>,
    Json(body): Json<CommandBody>,
) -> Json<CommandResponse> {
    let config = state.config.snapshot().await;

    let source: Arc<dyn OnCallSource> = match state.client(&config) {
        Ok(client) => Arc::new(client),
        Err(_) => Arc::new(Unconfigured),
    };

    debug!(command = %body.command, "executing slash command");
    let handler = CommandHandler::new(source, config.display.tz());
    Json(handler.handle(&body.command).await)
}

/// `GET /api/v1/command/autocomplete`
pub async fn autocomplete() -> Json<CommandRegistration> {
    Json(pagerbridge_command::registration())
}
