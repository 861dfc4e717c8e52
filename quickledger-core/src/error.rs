//! Core error types for `QuickLedger`.

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Credentials Error
// ============================================================================

/// Missing or invalid local OAuth setup, or a rejected token grant.
///
/// Never retried automatically.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CredentialsError {
    /// Human-readable description.
    pub message: String,
    /// Parsed response body when the error came from the token endpoint.
    pub payload: Option<Value>,
    /// Correlation id of the response that led to this error, if any.
    pub correlation_id: Option<String>,
}

impl CredentialsError {
    /// Creates a credentials error without a payload.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
            correlation_id: None,
        }
    }

    /// Attaches the parsed response body.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attaches the correlation id of the failing response.
    pub fn with_correlation_id(mut self, correlation_id: Option<String>) -> Self {
        self.correlation_id = correlation_id;
        self
    }
}

// ============================================================================
// API Error
// ============================================================================

/// Classification of a remote API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// HTTP 404.
    NotFound,
    /// HTTP 429. Callers may apply their own backoff.
    Throttled,
    /// HTTP 401 after the single refresh-and-retry was spent.
    Unauthorized,
    /// Any other 4xx.
    Client {
        /// HTTP status code.
        status: u16,
    },
    /// Any 5xx.
    Server {
        /// HTTP status code.
        status: u16,
    },
    /// The OAuth2 discovery document could not be loaded.
    Discovery,
}

/// An error reported by (or while talking to) the remote API.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    /// What went wrong.
    pub kind: ApiErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Parsed response body, raw response text, or request line.
    pub payload: Option<Value>,
    /// The `intuit_tid` correlation id of the failing response, if any.
    pub correlation_id: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            payload: None,
            correlation_id: None,
        }
    }

    /// Attaches a payload.
    pub fn with_payload(mut self, payload: impl Into<Option<Value>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Attaches a correlation id.
    pub fn with_correlation_id(mut self, correlation_id: Option<String>) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    /// Returns true if this is the throttling subtype (HTTP 429).
    pub fn is_throttling(&self) -> bool {
        self.kind == ApiErrorKind::Throttled
    }

    /// Returns true if the resource was not found (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound
    }

    /// Returns the HTTP status associated with this error, when known.
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            ApiErrorKind::NotFound => Some(404),
            ApiErrorKind::Throttled => Some(429),
            ApiErrorKind::Unauthorized => Some(401),
            ApiErrorKind::Client { status } | ApiErrorKind::Server { status } => Some(status),
            ApiErrorKind::Discovery => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_throttling_subtype() {
        let err = ApiError::new(ApiErrorKind::Throttled, "API request limit reached.");
        assert!(err.is_throttling());
        assert!(!err.is_not_found());
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn test_builder_attaches_fields() {
        let err = ApiError::new(ApiErrorKind::Client { status: 400 }, "bad")
            .with_payload(json!({"Fault": {}}))
            .with_correlation_id(Some("tid-1".to_string()));

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.correlation_id.as_deref(), Some("tid-1"));
        assert!(err.payload.is_some());
    }

    #[test]
    fn test_credentials_error_display() {
        let err = CredentialsError::new("Missing credentials.");
        assert_eq!(err.to_string(), "Missing credentials.");
        assert!(err.payload.is_none());
    }

    #[test]
    fn test_credentials_error_correlation_id() {
        let err = CredentialsError::new("Unsuccessful refresh_token grant.")
            .with_correlation_id(Some("tid-9".to_string()));
        assert_eq!(err.correlation_id.as_deref(), Some("tid-9"));
        assert!(CredentialsError::new("x").correlation_id.is_none());
    }
}
