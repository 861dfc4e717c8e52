//! The connector: one app identity, one company, one credential store.

use std::sync::Arc;

use quickledger_core::{ConnectorEvent, CredentialInitializer, Credentials, Endpoints};
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

use crate::credentials::CredentialStore;
use crate::error::ConnectorError;
use crate::settings::ConnectorSettings;
use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport};

/// Response header carrying the correlation id.
pub const CORRELATION_HEADER: &str = "intuit_tid";

/// Capacity of the event channel.
const EVENT_CAPACITY: usize = 16;

// ============================================================================
// Connector
// ============================================================================

/// Client for the accounting API.
///
/// Owns the credential store, the cached discovery endpoints, and the last
/// seen correlation id. Share it behind an `Arc`; every operation takes
/// `&self`.
///
/// Concurrent calls are allowed but not coordinated: two calls that both see
/// a 401 will both refresh, and [`Connector::last_correlation_id`] reflects
/// whichever response arrived last.
pub struct Connector {
    pub(crate) settings: ConnectorSettings,
    pub(crate) transport: Arc<dyn HttpTransport>,
    pub(crate) credentials: CredentialStore,
    pub(crate) initializer: Option<Arc<dyn CredentialInitializer>>,
    pub(crate) endpoints: RwLock<Option<Endpoints>>,
    last_correlation_id: RwLock<Option<String>>,
    events: broadcast::Sender<ConnectorEvent>,
}

impl Connector {
    /// Creates a builder for a connector with the given settings.
    pub fn builder(settings: ConnectorSettings) -> ConnectorBuilder {
        ConnectorBuilder::new(settings)
    }

    /// Returns the settings.
    pub fn settings(&self) -> &ConnectorSettings {
        &self.settings
    }

    /// Returns a copy of the current credentials.
    pub async fn credentials(&self) -> Credentials {
        self.credentials.snapshot().await
    }

    /// Merges `credentials` into the store.
    ///
    /// Present fields replace the stored value; absent fields are kept.
    pub async fn set_credentials(&self, credentials: &Credentials) {
        self.credentials.set(credentials).await;
    }

    /// Correlation id of the most recent response, from any call.
    pub async fn last_correlation_id(&self) -> Option<String> {
        self.last_correlation_id.read().await.clone()
    }

    /// Subscribes to credential refresh and revocation events.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectorEvent> {
        self.events.subscribe()
    }

    pub(crate) async fn record_correlation_id(&self, response: &HttpResponse) -> Option<String> {
        let id = response.header(CORRELATION_HEADER).map(str::to_string);
        *self.last_correlation_id.write().await = id.clone();
        id
    }

    pub(crate) fn emit(&self, event: ConnectorEvent) {
        let name = event.name();
        if self.events.send(event).is_err() {
            debug!(event = name, "No event subscribers");
        }
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("settings", &self.settings)
            .field("transport", &self.transport)
            .field("has_initializer", &self.initializer.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Connector Builder
// ============================================================================

/// Builder for [`Connector`].
pub struct ConnectorBuilder {
    settings: ConnectorSettings,
    credentials: Credentials,
    initializer: Option<Arc<dyn CredentialInitializer>>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl ConnectorBuilder {
    /// Creates a builder.
    pub fn new(settings: ConnectorSettings) -> Self {
        Self {
            settings,
            credentials: Credentials::default(),
            initializer: None,
            transport: None,
        }
    }

    /// Seeds the credential store.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sets the initializer consulted when credentials are incomplete.
    pub fn initializer(mut self, initializer: impl CredentialInitializer + 'static) -> Self {
        self.initializer = Some(Arc::new(initializer));
        self
    }

    /// Sets a shared initializer.
    pub fn shared_initializer(mut self, initializer: Arc<dyn CredentialInitializer>) -> Self {
        self.initializer = Some(initializer);
        self
    }

    /// Replaces the default `reqwest` transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validates the settings and builds the connector.
    pub fn build(self) -> Result<Connector, ConnectorError> {
        self.settings.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::with_timeout(self.settings.timeout)?),
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        debug!(
            sandbox = self.settings.sandbox,
            base_url = %self.settings.effective_base_url(),
            "Connector created"
        );

        Ok(Connector {
            settings: self.settings,
            transport,
            credentials: CredentialStore::new(self.credentials),
            initializer: self.initializer,
            endpoints: RwLock::new(None),
            last_correlation_id: RwLock::new(None),
            events,
        })
    }
}
