//! Canned-response [`Transport`] for tests of this crate and its consumers.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::query::QueryParams;
use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// A [`Transport`] that records every request and replays queued results.
///
/// Queued results are consumed in order. Once the queue is empty the
/// fallback response is returned, if one was set; otherwise the call fails
/// with a [`TransportError::Request`].
#[derive(Debug, Default)]
pub struct MockTransport {
    queue: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    fallback: Option<HttpResponse>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that answers every request with the same response.
    pub fn always(status: u16, body: impl Into<String>) -> Self {
        Self {
            fallback: Some(HttpResponse::new(status, body.into())),
            ..Self::default()
        }
    }

    /// Queue a response.
    #[must_use]
    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Ok(HttpResponse::new(status, body.into())));
        self
    }

    /// Queue a transport failure.
    #[must_use]
    pub fn fail(self, err: TransportError) -> Self {
        self.push(Err(err));
        self
    }

    fn push(&self, result: Result<HttpResponse, TransportError>) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(result);
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let queued = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match (queued, &self.fallback) {
            (Some(result), _) => result,
            (None, Some(response)) => Ok(response.clone()),
            (None, None) => Err(TransportError::Request(
                "mock transport has no response queued".into(),
            )),
        }
    }
}

/// Decode the query string of a recorded request.
pub fn query_of(request: &HttpRequest) -> QueryParams {
    reqwest::Url::parse(&request.url)
        .map(|url| url.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

/// Path of a recorded request, without the query string.
pub fn path_of(request: &HttpRequest) -> String {
    reqwest::Url::parse(&request.url)
        .map(|url| url.path().to_owned())
        .unwrap_or_default()
}

/// Parse the JSON body of a recorded request.
pub fn json_body_of(request: &HttpRequest) -> Option<serde_json::Value> {
    request
        .body
        .as_ref()
        .and_then(|body| serde_json::from_slice(body).ok())
}
