//! Credential lifecycle events.

use super::credentials::TokenSet;

/// Notification emitted by a connector when its credentials change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorEvent {
    /// A token grant succeeded; persist the new credentials.
    CredentialsRefreshed(TokenSet),
    /// The refresh token was revoked. Carries the raw response text.
    CredentialsRevoked(String),
}

impl ConnectorEvent {
    /// Short event name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CredentialsRefreshed(_) => "credentials.refreshed",
            Self::CredentialsRevoked(_) => "credentials.revoked",
        }
    }
}
