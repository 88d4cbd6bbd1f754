//! `PagerDuty` REST API client
//!
//! A typed client for the parts of the
//! [PagerDuty REST API v2](https://developer.pagerduty.com/api-reference/)
//! used to show schedules and on-calls in chat and to page people.
//!
//! # Quick Start
//!
//! ```no_run
//! use pagerbridge_client::PagerDutyClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pagerbridge_client::Error> {
//!     let client = PagerDutyClient::new("your-api-token", "")?;
//!
//!     let page = client.get_schedules(25, 0).await?;
//!     for schedule in &page.schedules {
//!         println!("{} ({})", schedule.name, schedule.time_zone);
//!     }
//!
//!     let on_calls = client.get_current_on_calls().await?;
//!     println!("{} people on call", on_calls.on_calls.len());
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Every operation returns a complete typed result or exactly one
//! [`Error`]: transport failures, API rejections (structured or not), and
//! decode failures are kept apart so callers can retry, surface, or log
//! them respectively. Nothing is retried internally.
//!
//! # Testing
//!
//! The client sends everything through a [`Transport`]. Inject
//! [`testing::MockTransport`] with [`PagerDutyClientBuilder::transport`] to
//! exercise callers without a network.

mod error;
mod query;
pub mod testing;
pub mod transport;
pub mod types;

pub use error::Error;
pub use query::QueryParams;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use types::{
    Assignment, AssigneeReference, ContactMethod, CreateIncidentRequest, CreateIncidentResponse,
    EscalationPolicy, FinalSchedule, Incident, LayerUser, ListResponse, OnCall, OnCallsResponse,
    OverrideSubcycle, RenderedScheduleEntry, Schedule, ScheduleDetail, ScheduleLayer,
    SchedulesResponse, Service, ServiceReference, ServicesResponse, User, UserReference,
};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::types::{ErrorResponse, ScheduleResponse};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.pagerduty.com";

/// API version requested through the `Accept` header.
pub const API_VERSION: &str = "2";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ACCEPT_MEDIA_TYPE: &str = "application/vnd.pagerduty+json;version=2";
const JSON_MEDIA_TYPE: &str = "application/json";

/// HTTP client for the `PagerDuty` REST API.
///
/// Holds only immutable state, so it is cheap to clone and safe to share
/// between tasks. To change the token or base URL, build a new client.
#[derive(Clone)]
pub struct PagerDutyClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_token: SecretString,
}

impl fmt::Debug for PagerDutyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagerDutyClient")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Builder for configuring a [`PagerDutyClient`].
pub struct PagerDutyClientBuilder {
    api_token: SecretString,
    base_url: String,
    timeout: Duration,
    transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for PagerDutyClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagerDutyClientBuilder")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("custom_transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}

impl PagerDutyClientBuilder {
    /// Create a builder for the given API token.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: SecretString::new(api_token.into()),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            transport: None,
        }
    }

    /// Override the API base URL. An empty string keeps the default.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        self.base_url = if trimmed.is_empty() {
            DEFAULT_BASE_URL.to_owned()
        } else {
            trimmed.to_owned()
        };
        self
    }

    /// Set the per-request timeout. Ignored when a custom transport is set.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send requests through a custom transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    ///
    /// Fails with [`Error::Configuration`] when the token is empty or the
    /// base URL does not parse. No request is sent.
    pub fn build(self) -> Result<PagerDutyClient, Error> {
        if self.api_token.expose_secret().trim().is_empty() {
            return Err(Error::Configuration(
                "PagerDuty API token is not configured".into(),
            ));
        }

        reqwest::Url::parse(&self.base_url).map_err(|e| {
            Error::Configuration(format!("invalid API base URL '{}': {e}", self.base_url))
        })?;

        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(
                ReqwestTransport::new(self.timeout)
                    .map_err(|e| Error::Configuration(e.to_string()))?,
            ),
        };

        Ok(PagerDutyClient {
            transport,
            base_url: self.base_url,
            api_token: self.api_token,
        })
    }
}

impl PagerDutyClient {
    /// Create a client with the default transport and timeout.
    ///
    /// An empty `base_url` selects [`DEFAULT_BASE_URL`].
    ///
    /// # Example
    ///
    /// ```
    /// use pagerbridge_client::PagerDutyClient;
    ///
    /// let client = PagerDutyClient::new("token", "").unwrap();
    /// assert_eq!(client.base_url(), "https://api.pagerduty.com");
    ///
    /// assert!(PagerDutyClient::new("", "").is_err());
    /// ```
    pub fn new(api_token: impl Into<String>, base_url: impl Into<String>) -> Result<Self, Error> {
        PagerDutyClientBuilder::new(api_token)
            .base_url(base_url)
            .build()
    }

    /// Create a builder for advanced configuration.
    pub fn builder(api_token: impl Into<String>) -> PagerDutyClientBuilder {
        PagerDutyClientBuilder::new(api_token)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // Request execution
    // =========================================================================

    fn headers(&self, with_body: bool) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();

        let mut auth =
            HeaderValue::from_str(&format!("Token token={}", self.api_token.expose_secret()))
                .map_err(|_| {
                    Error::Configuration("API token contains invalid header characters".into())
                })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_MEDIA_TYPE));
        if with_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
        }

        Ok(headers)
    }

    fn url(&self, path: &str, query: Option<&QueryParams>) -> Result<String, Error> {
        let mut url = format!("{}{path}", self.base_url);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            let encoded = query
                .encode()
                .map_err(|e| Error::InvalidRequest(format!("failed to encode query: {e}")))?;
            url.push('?');
            url.push_str(&encoded);
        }
        Ok(url)
    }

    /// Send one request and return the body of a successful response.
    ///
    /// Error statuses are classified here; decoding a success body is left
    /// to the caller.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: Option<&QueryParams>,
        body: Option<Bytes>,
    ) -> Result<Bytes, Error> {
        let request = HttpRequest {
            headers: self.headers(body.is_some())?,
            url: self.url(path, query)?,
            method,
            body,
        };

        debug!(method = %request.method, path, "sending request to PagerDuty");

        let response = self.transport.send(request).await?;

        if response.status >= 400 {
            let err = classify_error(response.status, &response.body);
            warn!(status = response.status, path, error = %err, "PagerDuty request failed");
            return Err(err);
        }

        debug!(status = response.status, path, "PagerDuty request succeeded");
        Ok(response.body)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&QueryParams>,
        context: &'static str,
    ) -> Result<T, Error> {
        let body = self.execute(Method::GET, path, query, None).await?;
        decode(&body, context)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
        context: &'static str,
    ) -> Result<T, Error> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| Error::InvalidRequest(format!("failed to encode request body: {e}")))?;
        let body = self
            .execute(Method::POST, path, None, Some(Bytes::from(body)))
            .await?;
        decode(&body, context)
    }

    // =========================================================================
    // Schedules
    // =========================================================================

    /// List schedules, one page at a time.
    ///
    /// No pagination loop runs here; use
    /// [`ListResponse::next_offset`] to request the next page.
    #[instrument(skip(self))]
    pub async fn get_schedules(&self, limit: u32, offset: u32) -> Result<SchedulesResponse, Error> {
        let query = page_query(limit, offset);
        self.get("/schedules", Some(&query), "schedules").await
    }

    /// Get one schedule with its rotation rendered over `[since, until]`.
    ///
    /// The server does the zone conversion. `since` must not be after
    /// `until`.
    #[instrument(skip(self))]
    pub async fn get_schedule(
        &self,
        schedule_id: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<ScheduleDetail, Error> {
        if schedule_id.is_empty() {
            return Err(Error::InvalidRequest("schedule id is required".into()));
        }
        if since > until {
            return Err(Error::InvalidRequest(format!(
                "schedule window starts after it ends ({} > {})",
                format_timestamp(since),
                format_timestamp(until)
            )));
        }

        let mut query = QueryParams::new();
        query
            .set("since", format_timestamp(since))
            .set("until", format_timestamp(until));

        let path = format!("/schedules/{}", encode_segment(schedule_id));
        let response: ScheduleResponse = self.get(&path, Some(&query), "schedule").await?;
        Ok(response.schedule)
    }

    // =========================================================================
    // On-calls
    // =========================================================================

    /// List on-call entries matching `params`.
    ///
    /// `None` or an empty set leaves the scope to the server's default
    /// filter.
    #[instrument(skip(self))]
    pub async fn get_on_calls(&self, params: Option<&QueryParams>) -> Result<OnCallsResponse, Error> {
        self.get("/oncalls", params, "oncalls").await
    }

    /// Who is on call right now, across every schedule.
    ///
    /// Asks for UTC times, embedded users and schedules, and only the
    /// earliest shift per escalation level.
    #[instrument(skip(self))]
    pub async fn get_current_on_calls(&self) -> Result<OnCallsResponse, Error> {
        self.get_on_calls(Some(&current_on_calls_query())).await
    }

    /// Who is on call for one schedule, with users embedded.
    ///
    /// Schedules come back as bare references: `name` is empty and the
    /// schedule's name is in `summary`.
    #[instrument(skip(self))]
    pub async fn get_on_calls_for_schedule(
        &self,
        schedule_id: &str,
    ) -> Result<OnCallsResponse, Error> {
        if schedule_id.is_empty() {
            return Err(Error::InvalidRequest("schedule id is required".into()));
        }
        self.get_on_calls(Some(&schedule_on_calls_query(schedule_id)))
            .await
    }

    // =========================================================================
    // Services
    // =========================================================================

    /// List services, one page at a time.
    #[instrument(skip(self))]
    pub async fn get_services(&self, limit: u32, offset: u32) -> Result<ServicesResponse, Error> {
        let query = page_query(limit, offset);
        self.get("/services", Some(&query), "services").await
    }

    // =========================================================================
    // Incidents
    // =========================================================================

    /// Open an incident on `service_id`, optionally assigned to users.
    ///
    /// Not idempotent. Once `PagerDuty` accepts the request the incident
    /// exists, even if decoding the echoed response then fails.
    #[instrument(skip(self, description, assignee_ids), fields(assignees = assignee_ids.len()))]
    pub async fn create_incident<S: AsRef<str>>(
        &self,
        title: &str,
        description: &str,
        service_id: &str,
        assignee_ids: &[S],
    ) -> Result<CreateIncidentResponse, Error> {
        if service_id.is_empty() {
            return Err(Error::InvalidRequest("service id is required".into()));
        }

        let request = CreateIncidentRequest {
            incident: Incident::new(title, description, service_id, assignee_ids),
        };
        self.post("/incidents", &request, "create incident").await
    }
}

fn page_query(limit: u32, offset: u32) -> QueryParams {
    let mut query = QueryParams::new();
    query
        .set("limit", limit.to_string())
        .set("offset", offset.to_string());
    query
}

fn current_on_calls_query() -> QueryParams {
    let mut query = QueryParams::new();
    query
        .set("time_zone", "UTC")
        .add("include[]", "users")
        .add("include[]", "schedules")
        .set("earliest", "true");
    query
}

fn schedule_on_calls_query(schedule_id: &str) -> QueryParams {
    let mut query = QueryParams::new();
    query
        .set("schedule_ids[]", schedule_id)
        .set("include[]", "users")
        .set("earliest", "true");
    query
}

/// RFC 3339 with whole seconds and a `Z` suffix.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, NON_ALPHANUMERIC).to_string()
}

fn decode<T: DeserializeOwned>(body: &[u8], context: &'static str) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|source| Error::Decode { context, source })
}

/// Turn an error status into [`Error::Api`] when the body carries a
/// non-empty error message, or [`Error::HttpStatus`] otherwise.
fn classify_error(status: u16, body: &[u8]) -> Error {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => Error::Api {
            status,
            message: envelope.error.message,
            code: envelope.error.code,
            errors: envelope.error.errors,
        },
        _ => Error::HttpStatus {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::testing::{MockTransport, json_body_of, path_of, query_of};

    const SCHEDULES_BODY: &str = r#"{
        "schedules": [
            {"id": "S1", "name": "Primary", "time_zone": "UTC"},
            {"id": "S2", "name": "Secondary", "description": "Backup", "time_zone": "Europe/Berlin"}
        ],
        "limit": 25, "offset": 0, "more": false, "total": null
    }"#;

    fn client_with(transport: &Arc<MockTransport>) -> PagerDutyClient {
        PagerDutyClient::builder("test-token")
            .base_url("https://api.pagerduty.com")
            .transport(Arc::clone(transport) as Arc<dyn Transport>)
            .build()
            .unwrap()
    }

    #[test]
    fn empty_base_url_uses_default() {
        let client = PagerDutyClient::new("token", "").unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn custom_base_url_is_trimmed() {
        let client = PagerDutyClient::new("token", "https://custom.pagerduty.com/").unwrap();
        assert_eq!(client.base_url(), "https://custom.pagerduty.com");
    }

    #[test]
    fn empty_token_is_a_configuration_error() {
        let err = PagerDutyClient::new("  ", "").unwrap_err();
        assert!(err.is_configuration_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn invalid_base_url_is_a_configuration_error() {
        let err = PagerDutyClient::new("token", "not a url").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn debug_does_not_leak_token() {
        let client = PagerDutyClient::new("super-secret", "").unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("super-secret"));
    }

    #[tokio::test]
    async fn get_request_carries_auth_and_accept_headers() {
        let transport = Arc::new(MockTransport::new().respond(200, SCHEDULES_BODY));
        let client = client_with(&transport);

        client.get_schedules(25, 0).await.unwrap();

        let req = transport.last_request().unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.headers[AUTHORIZATION], "Token token=test-token");
        assert_eq!(
            req.headers[ACCEPT],
            "application/vnd.pagerduty+json;version=2"
        );
        assert!(req.headers.get(CONTENT_TYPE).is_none());
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn get_schedules_sends_limit_and_offset() {
        let transport = Arc::new(MockTransport::new().respond(200, SCHEDULES_BODY));
        let client = client_with(&transport);

        let page = client.get_schedules(25, 50).await.unwrap();

        let req = transport.last_request().unwrap();
        assert_eq!(path_of(&req), "/schedules");
        let query = query_of(&req);
        assert_eq!(query.get("limit"), Some("25"));
        assert_eq!(query.get("offset"), Some("50"));
        assert!(page.schedules.len() <= 25);
        assert_eq!(page.schedules[1].description.as_deref(), Some("Backup"));
    }

    #[tokio::test]
    async fn get_schedules_is_repeatable() {
        let transport = Arc::new(MockTransport::always(200, SCHEDULES_BODY));
        let client = client_with(&transport);

        let first = client.get_schedules(25, 0).await.unwrap();
        let second = client.get_schedules(25, 0).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn unauthorized_with_envelope_is_api_error() {
        let transport = Arc::new(
            MockTransport::new().respond(401, r#"{"error":{"message":"Unauthorized","code":2010}}"#),
        );
        let client = client_with(&transport);

        let err = client.get_schedules(25, 0).await.unwrap_err();
        match err {
            Error::Api {
                status,
                message,
                code,
                ..
            } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Unauthorized");
                assert_eq!(code, 2010);
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn api_error_keeps_sub_errors() {
        let body = r#"{"error":{"message":"Invalid Input Provided","code":2001,"errors":["Service not found"]}}"#;
        let transport = Arc::new(MockTransport::new().respond(400, body));
        let client = client_with(&transport);

        let err = client
            .create_incident("T", "", "SVC404", &[] as &[&str])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Api { ref errors, .. } if errors == &vec!["Service not found".to_owned()]
        ));
    }

    #[tokio::test]
    async fn unparseable_error_body_is_http_status_error() {
        let transport = Arc::new(MockTransport::new().respond(500, "oops"));
        let client = client_with(&transport);

        let err = client.get_schedules(25, 0).await.unwrap_err();
        match err {
            Error::HttpStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "oops");
            }
            other => panic!("expected HttpStatus error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn envelope_without_message_is_http_status_error() {
        let transport = Arc::new(MockTransport::new().respond(404, r#"{"error":{"code":2100}}"#));
        let client = client_with(&transport);

        let err = client.get_services(10, 0).await.unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn malformed_success_body_is_decode_error() {
        let transport = Arc::new(MockTransport::new().respond(200, "{invalid json"));
        let client = client_with(&transport);

        let err = client.get_schedules(25, 0).await.unwrap_err();
        assert!(matches!(err, Error::Decode { context: "schedules", .. }));
        assert!(!err.is_api_error());
    }

    #[tokio::test]
    async fn transport_failure_is_transport_error() {
        let transport = Arc::new(
            MockTransport::new().fail(TransportError::Connect("network error".into())),
        );
        let client = client_with(&transport);

        let err = client.get_current_on_calls().await.unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::Connect(_))));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("network error"));
    }

    #[tokio::test]
    async fn get_schedule_sends_window_and_returns_detail() {
        let body = json!({
            "schedule": {
                "id": "SCHED1",
                "name": "Primary",
                "time_zone": "UTC",
                "final_schedule": {
                    "name": "Final Schedule",
                    "rendered_schedule_entries": [
                        {"user": {"id": "U1", "summary": "Ada"}, "start": "2024-05-01T00:00:00Z", "end": "2024-05-02T00:00:00Z"}
                    ]
                }
            }
        });
        let transport = Arc::new(MockTransport::new().respond(200, body.to_string()));
        let client = client_with(&transport);

        let since = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap();
        let detail = client.get_schedule("SCHED1", since, until).await.unwrap();

        let req = transport.last_request().unwrap();
        assert_eq!(path_of(&req), "/schedules/SCHED1");
        let query = query_of(&req);
        assert_eq!(query.get("since"), Some("2024-05-01T00:00:00Z"));
        assert_eq!(query.get("until"), Some("2024-05-08T00:00:00Z"));

        let entries = detail.final_schedule.unwrap().rendered_schedule_entries;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].start, "2024-05-01T00:00:00Z");
    }

    #[tokio::test]
    async fn get_schedule_encodes_the_id() {
        let transport = Arc::new(
            MockTransport::new().respond(200, r#"{"schedule":{"id":"a/b","name":"X"}}"#),
        );
        let client = client_with(&transport);
        let now = Utc::now();

        client.get_schedule("a/b", now, now).await.unwrap();

        let req = transport.last_request().unwrap();
        assert!(req.url.starts_with("https://api.pagerduty.com/schedules/a%2Fb?"));
    }

    #[tokio::test]
    async fn get_schedule_rejects_inverted_window_without_sending() {
        let transport = Arc::new(MockTransport::new());
        let client = client_with(&transport);

        let until = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let since = Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap();
        let err = client.get_schedule("S1", since, until).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn get_on_calls_without_params_sends_no_query() {
        let transport = Arc::new(MockTransport::new().respond(200, r#"{"oncalls": []}"#));
        let client = client_with(&transport);

        client.get_on_calls(None).await.unwrap();
        let req = transport.last_request().unwrap();
        assert_eq!(req.url, "https://api.pagerduty.com/oncalls");

        let transport = Arc::new(MockTransport::new().respond(200, r#"{"oncalls": []}"#));
        let client = client_with(&transport);
        client.get_on_calls(Some(&QueryParams::new())).await.unwrap();
        let req = transport.last_request().unwrap();
        assert_eq!(req.url, "https://api.pagerduty.com/oncalls");
    }

    #[tokio::test]
    async fn get_on_calls_passes_repeated_params() {
        let transport = Arc::new(MockTransport::new().respond(200, r#"{"oncalls": []}"#));
        let client = client_with(&transport);

        let params = QueryParams::new()
            .with("schedule_ids[]", "S1")
            .with("schedule_ids[]", "S2");
        client.get_on_calls(Some(&params)).await.unwrap();

        let query = query_of(&transport.last_request().unwrap());
        let ids: Vec<_> = query.get_all("schedule_ids[]").collect();
        assert_eq!(ids, vec!["S1", "S2"]);
    }

    #[tokio::test]
    async fn current_on_calls_query() {
        let body = r#"{
            "oncalls": [{
                "user": {"id": "U1", "name": "Ada", "email": "ada@example.com"},
                "schedule": {"id": "S1", "name": "Primary"},
                "escalation_level": 1,
                "start": "2024-05-01T00:00:00Z",
                "end": "2024-05-02T00:00:00Z"
            }],
            "limit": 25, "offset": 0, "more": false
        }"#;
        let transport = Arc::new(MockTransport::new().respond(200, body));
        let client = client_with(&transport);

        let response = client.get_current_on_calls().await.unwrap();
        assert_eq!(response.on_calls.len(), 1);
        assert_eq!(response.on_calls[0].user.email, "ada@example.com");

        let req = transport.last_request().unwrap();
        assert_eq!(path_of(&req), "/oncalls");
        let query = query_of(&req);
        assert_eq!(query.get("time_zone"), Some("UTC"));
        assert!(query.contains("include[]", "users"));
        assert!(query.contains("include[]", "schedules"));
        assert_eq!(query.get("earliest"), Some("true"));
        assert_eq!(query.len(), 4);
    }

    #[tokio::test]
    async fn on_calls_for_schedule_query() {
        let transport = Arc::new(MockTransport::new().respond(200, r#"{"oncalls": []}"#));
        let client = client_with(&transport);

        client.get_on_calls_for_schedule("SCHED123").await.unwrap();

        let query = query_of(&transport.last_request().unwrap());
        assert_eq!(query.get("schedule_ids[]"), Some("SCHED123"));
        assert!(query.contains("include[]", "users"));
        assert!(!query.contains("include[]", "schedules"));
        assert_eq!(query.get("earliest"), Some("true"));
        assert!(query.get("time_zone").is_none());
    }

    #[tokio::test]
    async fn on_calls_for_schedule_decodes_schedule_references() {
        let body = r#"{
            "oncalls": [{
                "user": {"id": "U1", "name": "Ada", "email": "ada@example.com"},
                "schedule": {"id": "SCHED123", "type": "schedule_reference", "summary": "Primary"},
                "escalation_level": 1,
                "start": "2024-05-01T00:00:00Z",
                "end": "2024-05-02T00:00:00Z"
            }],
            "limit": 25, "offset": 0, "more": false
        }"#;
        let transport = Arc::new(MockTransport::new().respond(200, body));
        let client = client_with(&transport);

        let response = client.get_on_calls_for_schedule("SCHED123").await.unwrap();

        assert_eq!(response.on_calls.len(), 1);
        let schedule = response.on_calls[0].schedule.as_ref().unwrap();
        assert_eq!(schedule.id, "SCHED123");
        assert_eq!(schedule.display_name(), "Primary");
        assert_eq!(response.on_calls[0].user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn get_services_decodes_page() {
        let body = r#"{
            "services": [{"id": "SVC1", "name": "API", "description": "Public API", "status": "active"}],
            "limit": 100, "offset": 0, "more": false, "total": 1
        }"#;
        let transport = Arc::new(MockTransport::new().respond(200, body));
        let client = client_with(&transport);

        let page = client.get_services(100, 0).await.unwrap();
        assert_eq!(page.services[0].status, "active");
        assert_eq!(page.pagination.total, Some(1));
        assert_eq!(path_of(&transport.last_request().unwrap()), "/services");
    }

    #[tokio::test]
    async fn create_incident_payload_with_assignees() {
        let echoed = json!({
            "incident": {
                "type": "incident",
                "id": "PINC1",
                "incident_number": 42,
                "title": "T",
                "status": "triggered",
                "created_at": "2024-05-01T12:00:00Z",
                "html_url": "https://acme.pagerduty.com/incidents/PINC1",
                "service": {"id": "SVC1", "type": "service_reference"}
            }
        });
        let transport = Arc::new(MockTransport::new().respond(201, echoed.to_string()));
        let client = client_with(&transport);

        let response = client
            .create_incident("T", "D", "SVC1", &["U1", "U2"])
            .await
            .unwrap();
        assert_eq!(response.incident.id.as_deref(), Some("PINC1"));
        assert_eq!(response.incident.status.as_deref(), Some("triggered"));
        assert_eq!(response.incident.incident_number, Some(42));

        let req = transport.last_request().unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(path_of(&req), "/incidents");
        assert_eq!(req.headers[CONTENT_TYPE], "application/json");

        let body = json_body_of(&req).unwrap();
        let incident = &body["incident"];
        assert_eq!(incident["type"], "incident");
        assert_eq!(incident["title"], "T");
        assert_eq!(incident["description"], "D");
        assert_eq!(incident["service"]["id"], "SVC1");
        assert_eq!(incident["service"]["type"], "service_reference");

        let assignments = incident["assignments"].as_array().unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0]["assignee"]["id"], "U1");
        assert!(
            assignments
                .iter()
                .all(|a| a["assignee"]["type"] == "user_reference")
        );
    }

    #[tokio::test]
    async fn create_incident_without_assignees_omits_field() {
        let echoed = r#"{"incident": {"type": "incident", "id": "PINC2", "title": "T", "service": {"id": "SVC1", "type": "service_reference"}}}"#;
        let transport = Arc::new(MockTransport::new().respond(201, echoed));
        let client = client_with(&transport);

        client
            .create_incident("T", "D", "SVC1", &[] as &[String])
            .await
            .unwrap();

        let body = json_body_of(&transport.last_request().unwrap()).unwrap();
        assert!(body["incident"].get("assignments").is_none());
    }

    #[tokio::test]
    async fn create_incident_decode_failure_is_not_api_error() {
        let transport = Arc::new(MockTransport::new().respond(201, r#"{"unexpected": true}"#));
        let client = client_with(&transport);

        let err = client
            .create_incident("T", "D", "SVC1", &["U1"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode { context: "create incident", .. }));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn requests_against_the_network_use_the_reqwest_transport() {
        use wiremock::matchers::{header, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/schedules"))
            .and(query_param("limit", "25"))
            .and(query_param("offset", "0"))
            .and(header("authorization", "Token token=live-token"))
            .and(header("accept", "application/vnd.pagerduty+json;version=2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SCHEDULES_BODY))
            .mount(&server)
            .await;

        let client = PagerDutyClient::new("live-token", server.uri()).unwrap();
        let page = client.get_schedules(25, 0).await.unwrap();
        assert_eq!(page.schedules.len(), 2);
    }
}
