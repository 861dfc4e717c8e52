//! OAuth2 credential models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Credentials
// ============================================================================

/// The credential set needed to call the accounting API.
///
/// Every field is optional: the same type describes the stored state and a
/// partial update merged into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// OAuth2 bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// OAuth2 refresh token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Company (tenant) identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_id: Option<String>,
}

impl Credentials {
    /// Creates a complete credential set.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        realm_id: impl Into<String>,
    ) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
            realm_id: Some(realm_id.into()),
        }
    }

    /// Sets the access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the refresh token.
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    /// Sets the realm id.
    pub fn with_realm_id(mut self, realm_id: impl Into<String>) -> Self {
        self.realm_id = Some(realm_id.into());
        self
    }

    /// Returns true when all three fields are present and non-empty.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Returns the names of the fields that are absent or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !present(self.access_token.as_ref()) {
            missing.push("access_token");
        }
        if !present(self.refresh_token.as_ref()) {
            missing.push("refresh_token");
        }
        if !present(self.realm_id.as_ref()) {
            missing.push("realm_id");
        }
        missing
    }

    /// Merges the present fields of `incoming` into `self`.
    ///
    /// Absent (or empty) incoming fields leave the stored value untouched.
    /// Returns the names of fields whose previously stored value was replaced
    /// by a different one.
    pub fn merge(&mut self, incoming: &Credentials) -> Vec<&'static str> {
        let mut rotated = Vec::new();
        for (name, current, next) in [
            ("access_token", &mut self.access_token, &incoming.access_token),
            ("refresh_token", &mut self.refresh_token, &incoming.refresh_token),
            ("realm_id", &mut self.realm_id, &incoming.realm_id),
        ] {
            let Some(next) = next.as_ref().filter(|v| !v.is_empty()) else {
                continue;
            };
            if current.as_ref().is_some_and(|c| !c.is_empty() && c != next) {
                rotated.push(name);
            }
            *current = Some(next.clone());
        }
        rotated
    }
}

fn present(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

// ============================================================================
// Endpoints
// ============================================================================

/// OAuth2 endpoints published by the discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Where users grant consent.
    pub authorization_endpoint: String,
    /// Where codes and refresh tokens are exchanged.
    pub token_endpoint: String,
    /// Where refresh tokens are revoked.
    pub revocation_endpoint: String,
}

// ============================================================================
// Token Set
// ============================================================================

/// Result of a successful token grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// The merged credential set after the grant.
    pub credentials: Credentials,
    /// Token type, usually `bearer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Access token lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Refresh token lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_refresh_token_expires_in: Option<i64>,
    /// When the grant was issued.
    pub issued_at: DateTime<Utc>,
}

impl TokenSet {
    /// When the access token expires, if the lifetime is known.
    pub fn access_token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_in
            .map(|secs| self.issued_at + Duration::seconds(secs))
    }

    /// When the refresh token expires, if the lifetime is known.
    pub fn refresh_token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.x_refresh_token_expires_in
            .map(|secs| self.issued_at + Duration::seconds(secs))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_never_clobbers_absent_fields() {
        let mut store = Credentials::default();
        store.merge(&Credentials::default().with_access_token("A"));
        store.merge(&Credentials::default().with_refresh_token("B"));

        assert_eq!(store.access_token.as_deref(), Some("A"));
        assert_eq!(store.refresh_token.as_deref(), Some("B"));
        assert_eq!(store.realm_id, None);
    }

    #[test]
    fn test_merge_reports_rotation() {
        let mut store = Credentials::new("A", "B", "123");
        let rotated = store.merge(&Credentials::default().with_access_token("A2").with_realm_id("123"));

        assert_eq!(rotated, vec!["access_token"]);
        assert_eq!(store.access_token.as_deref(), Some("A2"));
    }

    #[test]
    fn test_merge_ignores_empty_values() {
        let mut store = Credentials::new("A", "B", "123");
        let rotated = store.merge(&Credentials::default().with_access_token(""));

        assert!(rotated.is_empty());
        assert_eq!(store.access_token.as_deref(), Some("A"));
    }

    #[test]
    fn test_missing_fields() {
        let creds = Credentials::default().with_access_token("A");
        assert_eq!(creds.missing_fields(), vec!["refresh_token", "realm_id"]);
        assert!(!creds.is_complete());
        assert!(Credentials::new("A", "B", "1").is_complete());
    }

    #[test]
    fn test_token_set_expiry() {
        let issued_at = Utc::now();
        let set = TokenSet {
            credentials: Credentials::new("A", "B", "1"),
            token_type: Some("bearer".to_string()),
            expires_in: Some(3600),
            x_refresh_token_expires_in: None,
            issued_at,
        };

        assert_eq!(set.access_token_expires_at(), Some(issued_at + Duration::hours(1)));
        assert_eq!(set.refresh_token_expires_at(), None);
    }
}
