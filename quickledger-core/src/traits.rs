//! Trait definitions for `QuickLedger`.

use std::future::Future;

use async_trait::async_trait;

use crate::error::CredentialsError;
use crate::models::Credentials;

/// Supplies credentials when the connector finds its store incomplete.
///
/// The connector calls this at most once per logical call, before the first
/// request is sent, and once before revocation. The returned set is merged
/// into the store, so a partial set is fine. Returning `Ok(None)` means the
/// initializer has nothing to offer.
///
/// Any `Fn() -> impl Future<Output = Result<Option<Credentials>, CredentialsError>>`
/// closure implements this trait.
///
/// # Example
///
/// ```ignore
/// use quickledger_core::{Credentials, CredentialsError};
///
/// let initializer = || async {
///     Ok::<_, CredentialsError>(Some(Credentials::new("access", "refresh", "123")))
/// };
/// ```
#[async_trait]
pub trait CredentialInitializer: Send + Sync {
    /// Loads the caller's current credentials.
    async fn initial_credentials(&self) -> Result<Option<Credentials>, CredentialsError>;
}

#[async_trait]
impl<F, Fut> CredentialInitializer for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Credentials>, CredentialsError>> + Send + 'static,
{
    async fn initial_credentials(&self) -> Result<Option<Credentials>, CredentialsError> {
        (self)().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_closure_initializer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let initializer = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, CredentialsError>(Some(Credentials::default().with_realm_id("42"))) }
        };

        let boxed: Arc<dyn CredentialInitializer> = Arc::new(initializer);
        let creds = boxed.initial_credentials().await.unwrap().unwrap();

        assert_eq!(creds.realm_id.as_deref(), Some("42"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_initializer_error_propagates() {
        let initializer = || async { Err::<Option<Credentials>, _>(CredentialsError::new("vault locked")) };
        let err = initializer.initial_credentials().await.unwrap_err();
        assert_eq!(err.to_string(), "vault locked");
    }
}
