//! Fetch error types.

use quickledger_core::{ApiError, CredentialsError};
use thiserror::Error;

// ============================================================================
// Connector Error
// ============================================================================

/// Error returned by every public connector operation.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Missing local setup or a rejected token grant.
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    /// The remote API reported a failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A successful response carried a body that is not JSON.
    #[error("Invalid JSON in response: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl ConnectorError {
    /// Returns the API error, if this is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if the remote API throttled the request (HTTP 429).
    pub fn is_throttling(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_throttling)
    }

    /// Returns true if this is a local credentials problem.
    pub fn is_credentials(&self) -> bool {
        matches!(self, Self::Credentials(_))
    }

    /// Correlation id of the failing response, if one was recorded.
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            Self::Api(err) => err.correlation_id.as_deref(),
            Self::Credentials(err) => err.correlation_id.as_deref(),
            _ => None,
        }
    }

    /// Fills in `correlation_id` when the error does not carry one yet.
    pub(crate) fn or_correlation_id(mut self, correlation_id: Option<&str>) -> Self {
        let slot = match &mut self {
            Self::Api(err) => Some(&mut err.correlation_id),
            Self::Credentials(err) => Some(&mut err.correlation_id),
            _ => None,
        };
        if let Some(slot) = slot.filter(|slot| slot.is_none()) {
            *slot = correlation_id.map(str::to_string);
        }
        self
    }
}

// ============================================================================
// Transport Error
// ============================================================================

/// Failure below the HTTP status level.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request error (connect, TLS, timeout, body read).
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A header value contained characters HTTP does not allow.
    #[error("Invalid value for header {0}")]
    InvalidHeader(&'static str),
}
