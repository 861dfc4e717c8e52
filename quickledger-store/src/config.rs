//! Configuration management.
//!
//! The config file holds the app identity and environment. Every field can
//! be overridden from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `QUICKLEDGER_CLIENT_ID` | `client_id` |
//! | `QUICKLEDGER_CLIENT_SECRET` | `client_secret` |
//! | `QUICKLEDGER_REDIRECT_URI` | `redirect_uri` |
//! | `QUICKLEDGER_SANDBOX` | `sandbox` |
//! | `QUICKLEDGER_BASE_URL` | `base_url` |
//! | `QUICKLEDGER_MINOR_VERSION` | `minor_version` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use quickledger_fetch::ConnectorSettings;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_config_path, load_json_if_exists, save_json};

/// Connector configuration as stored on disk.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// OAuth2 client id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// OAuth2 client secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Redirect URI registered for the app.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    /// Use the sandbox environment.
    #[serde(default)]
    pub sandbox: bool,
    /// API host override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Discovery document override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_url: Option<String>,
    /// Default minor version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_version: Option<u32>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ConnectorConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from a file (defaults if it is missing), then
    /// applies environment overrides.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let mut config = Self::load_from(path).await?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Loads configuration from a file without environment overrides.
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        match load_json_if_exists(path).await? {
            Some(config) => {
                info!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            None => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Saves configuration to a file.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Applies overrides from `lookup` (normally the process environment).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), StoreError> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("QUICKLEDGER_CLIENT_ID") {
            self.client_id = Some(v);
        }
        if let Some(v) = get("QUICKLEDGER_CLIENT_SECRET") {
            self.client_secret = Some(v);
        }
        if let Some(v) = get("QUICKLEDGER_REDIRECT_URI") {
            self.redirect_uri = Some(v);
        }
        if let Some(v) = get("QUICKLEDGER_SANDBOX") {
            self.sandbox = parse_bool(&v).ok_or_else(|| {
                StoreError::Config(format!("QUICKLEDGER_SANDBOX must be true or false, got {v:?}"))
            })?;
        }
        if let Some(v) = get("QUICKLEDGER_BASE_URL") {
            self.base_url = Some(v);
        }
        if let Some(v) = get("QUICKLEDGER_MINOR_VERSION") {
            let minor = v.parse().map_err(|_| {
                StoreError::Config(format!("QUICKLEDGER_MINOR_VERSION must be a number, got {v:?}"))
            })?;
            self.minor_version = Some(minor);
        }
        Ok(())
    }

    /// Converts into connector settings.
    ///
    /// Fails if the app identity is incomplete.
    pub fn to_settings(&self) -> Result<ConnectorSettings, StoreError> {
        let require = |value: &Option<String>, name: &str| {
            value
                .clone()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| StoreError::Config(format!("{name} is not configured")))
        };

        let mut settings = ConnectorSettings::new(
            require(&self.client_id, "client_id")?,
            require(&self.client_secret, "client_secret")?,
            require(&self.redirect_uri, "redirect_uri")?,
        )
        .with_sandbox(self.sandbox);

        settings.base_url.clone_from(&self.base_url);
        settings.discovery_url.clone_from(&self.discovery_url);
        settings.minor_version = self.minor_version;
        if let Some(secs) = self.timeout_secs {
            settings.timeout = Duration::from_secs(secs);
        }
        Ok(settings)
    }
}

impl std::fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("redirect_uri", &self.redirect_uri)
            .field("sandbox", &self.sandbox)
            .field("base_url", &self.base_url)
            .field("minor_version", &self.minor_version)
            .finish_non_exhaustive()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = ConnectorConfig {
            client_id: Some("file-id".into()),
            minor_version: Some(65),
            ..Default::default()
        };
        config
            .apply_overrides(env(&[
                ("QUICKLEDGER_CLIENT_ID", "env-id"),
                ("QUICKLEDGER_SANDBOX", "true"),
                ("QUICKLEDGER_MINOR_VERSION", "75"),
                ("QUICKLEDGER_BASE_URL", ""),
            ]))
            .unwrap();

        assert_eq!(config.client_id.as_deref(), Some("env-id"));
        assert!(config.sandbox);
        assert_eq!(config.minor_version, Some(75));
        assert_eq!(config.base_url, None);
    }

    #[test]
    fn test_invalid_override() {
        let mut config = ConnectorConfig::default();
        let err = config
            .apply_overrides(env(&[("QUICKLEDGER_MINOR_VERSION", "latest")]))
            .unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_to_settings() {
        let config = ConnectorConfig {
            client_id: Some("id".into()),
            client_secret: Some("secret".into()),
            redirect_uri: Some("https://app/cb".into()),
            sandbox: true,
            minor_version: Some(70),
            timeout_secs: Some(5),
            ..Default::default()
        };

        let settings = config.to_settings().unwrap();
        assert_eq!(settings.effective_base_url(), "https://sandbox-quickbooks.api.intuit.com");
        assert_eq!(settings.minor_version, Some(70));
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_to_settings_requires_identity() {
        let err = ConnectorConfig::default().to_settings().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: client_id is not configured");
    }

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = ConnectorConfig::load_from(&temp_dir.path().join("config.json"))
            .await
            .unwrap();
        assert_eq!(config, ConnectorConfig::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        let config = ConnectorConfig {
            client_id: Some("id".into()),
            redirect_uri: Some("https://app/cb".into()),
            ..Default::default()
        };

        config.save_to(&path).await.unwrap();
        assert_eq!(ConnectorConfig::load_from(&path).await.unwrap(), config);
    }
}
