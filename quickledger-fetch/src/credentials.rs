//! Credential store owned by a connector.

use quickledger_core::{CredentialInitializer, Credentials, CredentialsError};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Holds the connector's current credentials.
///
/// Updates are merges: a field present in the incoming set replaces the
/// stored value, an absent field leaves it alone.
#[derive(Debug, Default)]
pub struct CredentialStore {
    inner: RwLock<Credentials>,
}

impl CredentialStore {
    /// Creates a store seeded with `credentials`.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            inner: RwLock::new(credentials),
        }
    }

    /// Merges `incoming` into the stored credentials.
    pub async fn set(&self, incoming: &Credentials) {
        let mut current = self.inner.write().await;
        for field in current.merge(incoming) {
            info!(field, "Stored credential replaced by a different value (token rotation)");
        }
    }

    /// Returns a copy of the stored credentials.
    pub async fn snapshot(&self) -> Credentials {
        self.inner.read().await.clone()
    }

    /// Makes sure all three fields are present.
    ///
    /// When the store is incomplete and an initializer is configured, the
    /// initializer runs once and its result is merged before checking again.
    pub async fn ensure_complete(
        &self,
        initializer: Option<&dyn CredentialInitializer>,
    ) -> Result<Credentials, CredentialsError> {
        let current = self.snapshot().await;
        if current.is_complete() {
            return Ok(current);
        }

        let Some(initializer) = initializer else {
            debug!(missing = ?current.missing_fields(), "Credentials incomplete, no initializer");
            return Err(CredentialsError::new(
                "Missing credentials. Please provide them explicitly, or use an initializer function.",
            ));
        };

        debug!(missing = ?current.missing_fields(), "Credentials incomplete, running initializer");
        if let Some(initial) = initializer.initial_credentials().await? {
            self.set(&initial).await;
        }

        let current = self.snapshot().await;
        if current.is_complete() {
            Ok(current)
        } else {
            debug!(missing = ?current.missing_fields(), "Credentials still incomplete");
            Err(CredentialsError::new("Missing credentials after initializer."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_set_merges() {
        let store = CredentialStore::default();
        store.set(&Credentials::default().with_access_token("A")).await;
        store.set(&Credentials::default().with_refresh_token("B")).await;

        let creds = store.snapshot().await;
        assert_eq!(creds.access_token.as_deref(), Some("A"));
        assert_eq!(creds.refresh_token.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn test_complete_store_skips_initializer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let initializer = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<Option<Credentials>, CredentialsError>(None) }
        };

        let store = CredentialStore::new(Credentials::new("A", "B", "1"));
        store.ensure_complete(Some(&initializer)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_initializer_fills_gaps() {
        let initializer = || async {
            Ok::<_, CredentialsError>(Some(Credentials::default().with_refresh_token("B").with_realm_id("1")))
        };

        let store = CredentialStore::new(Credentials::default().with_access_token("A"));
        let creds = store.ensure_complete(Some(&initializer)).await.unwrap();
        assert_eq!(creds, Credentials::new("A", "B", "1"));
    }

    #[tokio::test]
    async fn test_missing_without_initializer() {
        let store = CredentialStore::default();
        let err = store.ensure_complete(None).await.unwrap_err();
        assert!(err.message.starts_with("Missing credentials."));
    }

    #[tokio::test]
    async fn test_initializer_returns_partial() {
        let initializer = || async { Ok::<_, CredentialsError>(Some(Credentials::default().with_access_token("A"))) };

        let store = CredentialStore::default();
        let err = store.ensure_complete(Some(&initializer)).await.unwrap_err();
        assert_eq!(err.message, "Missing credentials after initializer.");
    }
}
