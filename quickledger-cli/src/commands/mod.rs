//! CLI command implementations.

pub mod auth;
pub mod batch;
pub mod entities;
pub mod records;
pub mod report;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use quickledger_core::ConnectorEvent;
use quickledger_entities::AccountingApi;
use quickledger_fetch::Connector;
use quickledger_store::{ConnectorConfig, CredentialFile};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

// ============================================================================
// Session
// ============================================================================

/// A connector wired to the config file and the credentials file.
pub struct Session {
    /// Entity API over the connector.
    pub api: AccountingApi,
    credentials: CredentialFile,
    events: broadcast::Receiver<ConnectorEvent>,
}

impl Session {
    /// Loads configuration and builds the connector.
    ///
    /// Stored credentials are loaded lazily, on the first call that needs them.
    pub async fn open(cli: &Cli) -> Result<Self> {
        let config_path = cli.config.clone().unwrap_or_else(ConnectorConfig::default_path);
        let mut config = ConnectorConfig::load(&config_path)
            .await
            .with_context(|| format!("Failed to load {}", config_path.display()))?;

        if cli.sandbox {
            config.sandbox = true;
        }
        if let Some(minor) = cli.minor_version {
            config.minor_version = Some(minor);
        }

        let settings = config.to_settings().with_context(|| {
            format!(
                "Edit {} or set QUICKLEDGER_CLIENT_ID, QUICKLEDGER_CLIENT_SECRET and QUICKLEDGER_REDIRECT_URI",
                config_path.display()
            )
        })?;

        let credentials = cli
            .credentials
            .clone()
            .map_or_else(CredentialFile::default_location, CredentialFile::new);
        debug!(path = %credentials.path().display(), "Using credentials file");

        let connector = Connector::builder(settings)
            .initializer(credentials.clone())
            .build()?;
        let events = connector.subscribe();

        Ok(Self {
            api: AccountingApi::new(Arc::new(connector)),
            credentials,
            events,
        })
    }

    /// Returns the connector.
    pub fn connector(&self) -> &Connector {
        self.api.connector()
    }

    /// Writes any credential changes from the calls made so far.
    ///
    /// Call this even when the command failed: a refresh may have rotated
    /// the tokens before the failing call.
    pub async fn persist(&mut self) -> Result<()> {
        let applied = self
            .credentials
            .apply_pending(&mut self.events)
            .await
            .with_context(|| format!("Failed to update {}", self.credentials.path().display()))?;
        if applied > 0 {
            debug!(applied, "Persisted credential events");
        }
        Ok(())
    }

    /// Persists credential changes, then hands back `result`.
    pub async fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        self.persist().await?;
        result
    }
}

// ============================================================================
// Shared Arguments
// ============================================================================

/// A JSON payload from the command line, a file, or stdin.
#[derive(Args, Debug, Default)]
pub struct PayloadArgs {
    /// Inline JSON payload.
    #[arg(long, short, conflicts_with = "file", required_unless_present = "file")]
    pub data: Option<String>,

    /// Read the JSON payload from a file ("-" for stdin).
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl PayloadArgs {
    /// Reads and parses the payload.
    pub async fn read(&self) -> Result<Value> {
        let text = match (&self.data, &self.file) {
            (Some(data), _) => data.clone(),
            (None, Some(path)) if path.as_os_str() == "-" => {
                std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
            }
            (None, Some(path)) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
            (None, None) => anyhow::bail!("Provide a payload with --data or --file"),
        };
        serde_json::from_str(&text).context("Payload is not valid JSON")
    }
}

// ============================================================================
// Output
// ============================================================================

/// Prints an API response in the selected format.
pub fn print_value(value: &Value, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_value(value)?);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(value)?);
        }
    }
    Ok(())
}
