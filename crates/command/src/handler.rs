use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::render::{help_text, render_on_calls, render_schedules};
use crate::response::CommandResponse;
use crate::source::OnCallSource;

/// A recognised subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    Help,
    Schedules,
    OnCall,
}

impl Subcommand {
    pub const ALL: [Self; 3] = [Self::Help, Self::Schedules, Self::OnCall];

    pub fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Schedules => "schedules",
            Self::OnCall => "oncall",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Help => "Shows this help message",
            Self::Schedules => "List all PagerDuty schedules",
            Self::OnCall => "Show who's currently on-call",
        }
    }

    fn parse(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sub| sub.name() == word)
    }
}

/// Runs `/pagerduty` command lines against an [`OnCallSource`].
pub struct CommandHandler {
    source: Arc<dyn OnCallSource>,
    time_zone: Tz,
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("time_zone", &self.time_zone)
            .finish_non_exhaustive()
    }
}

impl CommandHandler {
    /// Shift end times are rendered in `time_zone`.
    pub fn new(source: Arc<dyn OnCallSource>, time_zone: Tz) -> Self {
        Self { source, time_zone }
    }

    /// Handle a full command line such as `/pagerduty oncall`.
    pub async fn handle(&self, command: &str) -> CommandResponse {
        self.handle_at(command, Utc::now()).await
    }

    /// Like [`handle`](Self::handle), with "today" and "tomorrow" judged
    /// against `now`.
    pub async fn handle_at(&self, command: &str, now: DateTime<Utc>) -> CommandResponse {
        // The first word is the trigger itself.
        let Some(word) = command.split_whitespace().nth(1) else {
            return CommandResponse::ephemeral(help_text());
        };

        match Subcommand::parse(word) {
            Some(Subcommand::Help) => CommandResponse::ephemeral(help_text()),
            Some(Subcommand::Schedules) => self.schedules().await,
            Some(Subcommand::OnCall) => self.on_calls(now).await,
            None => {
                debug!(subcommand = word, "unknown subcommand");
                CommandResponse::ephemeral(format!(
                    "Unknown subcommand: {word}\n\n{}",
                    help_text()
                ))
            }
        }
    }

    async fn schedules(&self) -> CommandResponse {
        match self.source.schedules().await {
            Ok(response) => CommandResponse::ephemeral(render_schedules(&response)),
            Err(e) => {
                warn!(error = %e, "failed to list schedules for command");
                CommandResponse::ephemeral(format!(
                    "Failed to retrieve schedules: {}",
                    e.user_message()
                ))
            }
        }
    }

    async fn on_calls(&self, now: DateTime<Utc>) -> CommandResponse {
        match self.source.current_on_calls().await {
            Ok(response) => {
                CommandResponse::ephemeral(render_on_calls(&response, self.time_zone, now))
            }
            Err(e) => {
                warn!(error = %e, "failed to list on-calls for command");
                CommandResponse::ephemeral(format!(
                    "Failed to retrieve on-call users: {}",
                    e.user_message()
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::TimeZone;
    use pagerbridge_client::testing::MockTransport;
    use pagerbridge_client::{
        Error, OnCall, OnCallsResponse, PagerDutyClient, Schedule, SchedulesResponse, Transport,
        TransportError, User,
    };

    use super::*;
    use crate::ResponseType;

    /// Returns its canned data, or a connection failure when there is none.
    #[derive(Default)]
    struct CannedSource {
        schedules: Option<SchedulesResponse>,
        on_calls: Option<OnCallsResponse>,
    }

    #[async_trait]
    impl OnCallSource for CannedSource {
        async fn schedules(&self) -> Result<SchedulesResponse, Error> {
            self.schedules
                .clone()
                .ok_or_else(|| Error::Transport(TransportError::Connect("refused".into())))
        }

        async fn current_on_calls(&self) -> Result<OnCallsResponse, Error> {
            self.on_calls
                .clone()
                .ok_or_else(|| Error::Transport(TransportError::Connect("refused".into())))
        }
    }

    fn handler(source: CannedSource) -> CommandHandler {
        CommandHandler::new(Arc::new(source), Tz::UTC)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn bare_trigger_and_help_show_help() {
        let handler = handler(CannedSource::default());
        for line in ["/pagerduty", "/pagerduty help", "  /pagerduty   help  "] {
            let response = handler.handle(line).await;
            assert_eq!(response.response_type, ResponseType::Ephemeral);
            assert!(response.text.contains("PagerDuty Plugin Commands"), "{line}");
        }
    }

    #[tokio::test]
    async fn unknown_subcommand() {
        let response = handler(CannedSource::default())
            .handle("/pagerduty unknown")
            .await;
        assert!(response.text.starts_with("Unknown subcommand: unknown\n\n"));
        assert!(response.text.contains("PagerDuty Plugin Commands"));
    }

    #[tokio::test]
    async fn schedules_subcommand() {
        let source = CannedSource {
            schedules: Some(SchedulesResponse {
                schedules: vec![Schedule {
                    id: "SCHED1".into(),
                    name: "Primary On-Call".into(),
                    time_zone: "America/New_York".into(),
                    ..Schedule::default()
                }],
                ..SchedulesResponse::default()
            }),
            ..CannedSource::default()
        };

        let response = handler(source).handle("/pagerduty schedules").await;
        assert!(response.text.contains("**Primary On-Call**"));
        assert!(response.text.contains("America/New_York"));
    }

    #[tokio::test]
    async fn oncall_subcommand() {
        let source = CannedSource {
            on_calls: Some(OnCallsResponse {
                on_calls: vec![OnCall {
                    user: User {
                        id: "USER1".into(),
                        name: "John Doe".into(),
                        email: "john@example.com".into(),
                        ..User::default()
                    },
                    end: Some("2024-05-01T17:00:00Z".into()),
                    ..OnCall::default()
                }],
                ..OnCallsResponse::default()
            }),
            ..CannedSource::default()
        };

        let response = handler(source).handle_at("/pagerduty oncall", now()).await;
        assert!(response.text.contains("### Currently On-Call"));
        assert!(
            response
                .text
                .contains("• John Doe (john@example.com) - until 5:00 PM today")
        );
    }

    #[tokio::test]
    async fn upstream_failure_is_rendered_not_raised() {
        let handler = handler(CannedSource::default());

        let response = handler.handle("/pagerduty schedules").await;
        assert_eq!(
            response.text,
            "Failed to retrieve schedules: PagerDuty could not be reached"
        );

        let response = handler.handle("/pagerduty oncall").await;
        assert_eq!(
            response.text,
            "Failed to retrieve on-call users: PagerDuty could not be reached"
        );
    }

    #[tokio::test]
    async fn client_is_an_on_call_source() {
        let transport = Arc::new(MockTransport::new().respond(
            401,
            r#"{"error":{"message":"Unauthorized","code":2010}}"#,
        ));
        let client = PagerDutyClient::builder("token")
            .transport(Arc::clone(&transport) as Arc<dyn Transport>)
            .build()
            .unwrap();

        let response = CommandHandler::new(Arc::new(client), Tz::UTC)
            .handle("/pagerduty schedules")
            .await;
        assert_eq!(response.text, "Failed to retrieve schedules: Unauthorized");

        let query = pagerbridge_client::testing::query_of(&transport.last_request().unwrap());
        assert_eq!(query.get("limit"), Some("100"));
    }
}
