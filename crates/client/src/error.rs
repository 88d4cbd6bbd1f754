//! Error types for the `PagerDuty` client.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors that can occur when using the `PagerDuty` client.
///
/// Every client operation fails with exactly one of these. Transport,
/// HTTP-status and decode failures never overlap.
#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration is missing or unusable (API token, base URL).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The caller's arguments break an operation's precondition. Detected
    /// before any request is sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request never produced a response (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// `PagerDuty` understood the request and rejected it.
    #[error("PagerDuty API error: {message} (code: {code})")]
    Api {
        /// HTTP status of the rejection.
        status: u16,
        /// Error message from the API's error envelope.
        message: String,
        /// Numeric `PagerDuty` error code.
        code: i64,
        /// Detail messages, if any.
        errors: Vec<String>,
    },

    /// Error status whose body was not a usable error envelope.
    #[error("PagerDuty API error: HTTP {status} - {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A successful response did not match the expected schema.
    #[error("failed to decode {context} response: {source}")]
    Decode {
        /// What was being decoded.
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns `true` if the request may succeed when sent again.
    ///
    /// Only transport failures qualify. No retry happens inside the client.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` if this is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` if the API returned a structured error.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Returns `true` if the client is missing its configuration.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns the `PagerDuty` error code if this is an API error.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns the upstream HTTP status, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text that can be shown to an end user.
    ///
    /// API messages pass through verbatim. Decode failures are not
    /// actionable for users and collapse to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration(_) => "PagerDuty is not configured".to_owned(),
            Self::InvalidRequest(msg) => msg.clone(),
            Self::Transport(e) if e.is_timeout() => "PagerDuty did not respond in time".to_owned(),
            Self::Transport(_) => "PagerDuty could not be reached".to_owned(),
            Self::Api { message, .. } => message.clone(),
            Self::HttpStatus { status, .. } => format!("PagerDuty returned HTTP {status}"),
            Self::Decode { .. } => "unexpected response from PagerDuty".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_error() -> Error {
        let source = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        Error::Decode {
            context: "schedules",
            source,
        }
    }

    #[test]
    fn only_transport_errors_are_retryable() {
        let err = Error::Transport(TransportError::Connect("refused".into()));
        assert!(err.is_retryable());

        let api = Error::Api {
            status: 429,
            message: "Rate limit".into(),
            code: 2020,
            errors: vec![],
        };
        assert!(!api.is_retryable());
        assert!(!decode_error().is_retryable());
        assert!(!Error::Configuration("missing".into()).is_retryable());
        assert!(
            !Error::HttpStatus {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn timeout_is_detected() {
        let err = Error::Transport(TransportError::Timeout("30s elapsed".into()));
        assert!(err.is_timeout());
        assert_eq!(err.user_message(), "PagerDuty did not respond in time");
    }

    #[test]
    fn api_code_and_status() {
        let err = Error::Api {
            status: 401,
            message: "Unauthorized".into(),
            code: 2010,
            errors: vec![],
        };
        assert!(err.is_api_error());
        assert_eq!(err.api_code(), Some(2010));
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.user_message(), "Unauthorized");
    }

    #[test]
    fn display_messages() {
        let err = Error::Api {
            status: 400,
            message: "Invalid Input Provided".into(),
            code: 2001,
            errors: vec!["Title is required".into()],
        };
        assert_eq!(
            err.to_string(),
            "PagerDuty API error: Invalid Input Provided (code: 2001)"
        );

        let err = Error::HttpStatus {
            status: 500,
            body: "oops".into(),
        };
        assert_eq!(err.to_string(), "PagerDuty API error: HTTP 500 - oops");
        assert_eq!(err.user_message(), "PagerDuty returned HTTP 500");

        assert!(
            decode_error()
                .to_string()
                .starts_with("failed to decode schedules response")
        );
        assert_eq!(decode_error().user_message(), "unexpected response from PagerDuty");
    }
}
