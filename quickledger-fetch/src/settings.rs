//! Connector settings.

use std::fmt;
use std::time::Duration;

use quickledger_core::CredentialsError;

use crate::transport::DEFAULT_TIMEOUT;

/// Production API host.
pub const PRODUCTION_BASE_URL: &str = "https://quickbooks.api.intuit.com";

/// Sandbox API host.
pub const SANDBOX_BASE_URL: &str = "https://sandbox-quickbooks.api.intuit.com";

/// Production OAuth2 discovery document.
pub const PRODUCTION_DISCOVERY_URL: &str =
    "https://developer.api.intuit.com/.well-known/openid_configuration";

/// Sandbox OAuth2 discovery document.
pub const SANDBOX_DISCOVERY_URL: &str =
    "https://developer.api.intuit.com/.well-known/openid_sandbox_configuration";

/// Scope requested by the authorization URL.
pub const ACCOUNTING_SCOPE: &str = "com.intuit.quickbooks.accounting";

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("QuickLedger Rust Connector/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Connector Settings
// ============================================================================

/// Static configuration of one connector.
#[derive(Clone)]
pub struct ConnectorSettings {
    /// OAuth2 client id.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Redirect URI registered for the app.
    pub redirect_uri: String,
    /// Use the sandbox hosts and discovery document.
    pub sandbox: bool,
    /// Overrides the API host.
    pub base_url: Option<String>,
    /// Overrides the discovery document URL.
    pub discovery_url: Option<String>,
    /// Default `minorversion` for entity operations.
    pub minor_version: Option<u32>,
    /// Scope requested by the authorization URL.
    pub scope: String,
    /// User agent header.
    pub user_agent: String,
    /// Request timeout for the default transport.
    pub timeout: Duration,
}

impl ConnectorSettings {
    /// Creates production settings for an app.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            sandbox: false,
            base_url: None,
            discovery_url: None,
            minor_version: None,
            scope: ACCOUNTING_SCOPE.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Switches to the sandbox environment.
    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Overrides the API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Overrides the discovery document URL.
    pub fn with_discovery_url(mut self, url: impl Into<String>) -> Self {
        self.discovery_url = Some(url.into());
        self
    }

    /// Sets the default minor version.
    pub fn with_minor_version(mut self, minor_version: u32) -> Self {
        self.minor_version = Some(minor_version);
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// API host in effect, without a trailing slash.
    pub fn effective_base_url(&self) -> &str {
        let url = match &self.base_url {
            Some(url) => url.as_str(),
            None if self.sandbox => SANDBOX_BASE_URL,
            None => PRODUCTION_BASE_URL,
        };
        url.trim_end_matches('/')
    }

    /// Discovery document URL in effect.
    pub fn effective_discovery_url(&self) -> &str {
        match &self.discovery_url {
            Some(url) => url,
            None if self.sandbox => SANDBOX_DISCOVERY_URL,
            None => PRODUCTION_DISCOVERY_URL,
        }
    }

    /// Checks that the app identity is configured.
    pub fn validate(&self) -> Result<(), CredentialsError> {
        let missing: Vec<&str> = [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", &self.redirect_uri),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CredentialsError::new(format!(
                "Connector is missing required configuration: {}.",
                missing.join(", ")
            )))
        }
    }
}

impl fmt::Debug for ConnectorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("sandbox", &self.sandbox)
            .field("base_url", &self.effective_base_url())
            .field("minor_version", &self.minor_version)
            .finish_non_exhaustive()
    }
}
