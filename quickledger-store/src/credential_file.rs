//! Caller-owned credential persistence.
//!
//! The connector never writes credentials anywhere. [`CredentialFile`] is
//! the caller side: it seeds a connector through [`CredentialInitializer`]
//! and follows the connector's events to keep the file current.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quickledger_core::{ConnectorEvent, CredentialInitializer, Credentials, CredentialsError};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_credentials_path, load_json_if_exists, remove_file, save_json};

/// A JSON credentials file, written atomically with owner-only permissions.
#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl CredentialFile {
    /// Creates a handle for `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses the default credentials path.
    pub fn default_location() -> Self {
        Self::new(default_credentials_path())
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored credentials, if the file exists.
    pub async fn load(&self) -> Result<Option<Credentials>, StoreError> {
        load_json_if_exists(&self.path).await
    }

    /// Writes `credentials`, replacing the file.
    pub async fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        save_json(&self.path, credentials).await
    }

    /// Deletes the file.
    pub async fn remove(&self) -> Result<(), StoreError> {
        remove_file(&self.path).await
    }

    /// Applies one connector event to the file.
    pub async fn apply(&self, event: &ConnectorEvent) -> Result<(), StoreError> {
        match event {
            ConnectorEvent::CredentialsRefreshed(tokens) => {
                self.save(&tokens.credentials).await?;
                info!(path = %self.path.display(), "Saved refreshed credentials");
            }
            ConnectorEvent::CredentialsRevoked(_) => {
                self.remove().await?;
                info!(path = %self.path.display(), "Removed revoked credentials");
            }
        }
        Ok(())
    }

    /// Applies every event already queued on `events`, without waiting.
    ///
    /// Returns the number of events applied.
    pub async fn apply_pending(
        &self,
        events: &mut broadcast::Receiver<ConnectorEvent>,
    ) -> Result<usize, StoreError> {
        let mut applied = 0;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    self.apply(&event).await?;
                    applied += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed credential events");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(applied),
            }
        }
    }

    /// Follows `events` until the connector is dropped.
    ///
    /// Write failures are logged and do not stop the loop.
    pub async fn persist_events(&self, mut events: broadcast::Receiver<ConnectorEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(e) = self.apply(&event).await {
                        warn!(event = event.name(), error = %e, "Failed to persist credential event");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed credential events");
                }
                Err(RecvError::Closed) => {
                    debug!("Event channel closed");
                    return;
                }
            }
        }
    }
}

#[async_trait]
impl CredentialInitializer for CredentialFile {
    async fn initial_credentials(&self) -> Result<Option<Credentials>, CredentialsError> {
        debug!(path = %self.path.display(), "Loading credentials from file");
        Ok(self.load().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quickledger_core::TokenSet;

    fn refreshed(credentials: Credentials) -> ConnectorEvent {
        ConnectorEvent::CredentialsRefreshed(TokenSet {
            credentials,
            token_type: Some("bearer".into()),
            expires_in: Some(3600),
            x_refresh_token_expires_in: None,
            issued_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_initializer_reads_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = CredentialFile::new(temp_dir.path().join("credentials.json"));

        assert_eq!(file.initial_credentials().await.unwrap(), None);

        file.save(&Credentials::new("A", "B", "1")).await.unwrap();
        assert_eq!(
            file.initial_credentials().await.unwrap(),
            Some(Credentials::new("A", "B", "1"))
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_credentials_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("credentials.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let err = CredentialFile::new(&path).initial_credentials().await.unwrap_err();
        assert!(err.message.starts_with("Unable to load stored credentials"));
    }

    #[tokio::test]
    async fn test_apply_pending() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = CredentialFile::new(temp_dir.path().join("credentials.json"));
        let (tx, mut rx) = broadcast::channel(4);

        tx.send(refreshed(Credentials::new("A1", "B1", "1"))).unwrap();
        tx.send(refreshed(Credentials::new("A2", "B2", "1"))).unwrap();
        assert_eq!(file.apply_pending(&mut rx).await.unwrap(), 2);
        assert_eq!(file.load().await.unwrap(), Some(Credentials::new("A2", "B2", "1")));

        tx.send(ConnectorEvent::CredentialsRevoked(String::new())).unwrap();
        assert_eq!(file.apply_pending(&mut rx).await.unwrap(), 1);
        assert_eq!(file.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_persist_events_until_closed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = CredentialFile::new(temp_dir.path().join("credentials.json"));
        let (tx, rx) = broadcast::channel(4);

        tx.send(refreshed(Credentials::new("A", "B", "9"))).unwrap();
        drop(tx);
        file.persist_events(rx).await;

        assert_eq!(file.load().await.unwrap(), Some(Credentials::new("A", "B", "9")));
    }
}
