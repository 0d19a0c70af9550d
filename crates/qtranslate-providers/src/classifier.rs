//! Failure classification for a single provider call attempt.
//!
//! Transient conditions (rate limits, gateway errors, timeouts, network
//! hiccups) are retryable; anything else fails immediately.

use std::error::Error as StdError;

use thiserror::Error;

/// HTTP statuses worth another attempt.
pub const RETRYABLE_STATUS_CODES: &[u16] = &[429, 500, 502, 503, 504];

/// Why one attempt did not produce a usable response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttemptError {
    /// Non-2xx response. `message` is `error.message` from the body when present.
    #[error("API Error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Network error: {0}")]
    Transport(String),

    /// A 2xx response that could not be used.
    #[error("{0}")]
    Protocol(String),

    #[error("Request was cancelled")]
    Cancelled,
}

impl AttemptError {
    /// Map a reqwest failure: timeouts stay distinct, everything else is transport.
    pub fn from_reqwest(err: &reqwest::Error, timeout_seconds: u64) -> Self {
        if err.is_timeout() {
            AttemptError::Timeout {
                seconds: timeout_seconds,
            }
        } else {
            AttemptError::Transport(error_chain(err))
        }
    }
}

/// How the retry driver should treat a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Retryable,
    Permanent,
    Cancelled,
}

/// Classify an attempt failure.
pub fn classify(err: &AttemptError) -> FailureClass {
    match err {
        AttemptError::Status { status, .. } => classify_status(*status),
        AttemptError::Timeout { .. } | AttemptError::Transport(_) => FailureClass::Retryable,
        AttemptError::Protocol(_) => FailureClass::Permanent,
        AttemptError::Cancelled => FailureClass::Cancelled,
    }
}

/// Classify a non-2xx HTTP status.
pub fn classify_status(status: u16) -> FailureClass {
    if RETRYABLE_STATUS_CODES.contains(&status) {
        FailureClass::Retryable
    } else {
        FailureClass::Permanent
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> AttemptError {
        AttemptError::Status {
            status: code,
            message: "x".into(),
        }
    }

    #[test]
    fn test_retryable_statuses() {
        for code in [429, 500, 502, 503, 504] {
            assert_eq!(classify(&status(code)), FailureClass::Retryable, "{code}");
        }
    }

    #[test]
    fn test_permanent_statuses() {
        for code in [400, 401, 403, 404, 422, 501, 505] {
            assert_eq!(classify(&status(code)), FailureClass::Permanent, "{code}");
        }
    }

    #[test]
    fn test_transport_and_timeout_retry() {
        assert_eq!(
            classify(&AttemptError::Timeout { seconds: 5 }),
            FailureClass::Retryable
        );
        assert_eq!(
            classify(&AttemptError::Transport("connection refused".into())),
            FailureClass::Retryable
        );
    }

    #[test]
    fn test_protocol_and_cancel() {
        assert_eq!(
            classify(&AttemptError::Protocol("Empty response from API".into())),
            FailureClass::Permanent
        );
        assert_eq!(classify(&AttemptError::Cancelled), FailureClass::Cancelled);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            AttemptError::Status {
                status: 401,
                message: "invalid_api_key".into()
            }
            .to_string(),
            "API Error (401): invalid_api_key"
        );
        assert_eq!(
            AttemptError::Timeout { seconds: 60 }.to_string(),
            "Request timed out after 60s"
        );
        assert_eq!(AttemptError::Cancelled.to_string(), "Request was cancelled");
    }

    #[tokio::test]
    async fn test_from_reqwest_connect_failure_is_transport() {
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1")
            .send()
            .await
            .unwrap_err();
        let mapped = AttemptError::from_reqwest(&err, 10);
        assert!(matches!(mapped, AttemptError::Transport(_)));
        assert_eq!(classify(&mapped), FailureClass::Retryable);
    }
}
