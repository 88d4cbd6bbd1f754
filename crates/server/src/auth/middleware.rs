use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header::HeaderName;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};
use tracing::debug;

use super::identity::UserId;

/// Tower layer that requires the host's user header on every request.
#[derive(Debug, Clone)]
pub struct UserHeaderLayer {
    header: HeaderName,
}

impl UserHeaderLayer {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl<S> Layer<S> for UserHeaderLayer {
    type Service = UserHeaderMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        UserHeaderMiddleware {
            inner,
            header: self.header.clone(),
        }
    }
}

/// Tower service that rejects requests without a user id.
#[derive(Debug, Clone)]
pub struct UserHeaderMiddleware<S> {
    inner: S,
    header: HeaderName,
}

impl<S> Service<Request<Body>> for UserHeaderMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let user = req
            .headers()
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| UserId(v.to_owned()));

        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(user) = user else {
                debug!(path = %req.uri().path(), "request without user header");
                return Ok(unauthorized());
            };

            req.extensions_mut().insert(user);
            inner.call(req).await
        })
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Not authorized").into_response()
}
