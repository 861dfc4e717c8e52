// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `QuickLedger` Store
//!
//! Caller-side configuration and credential storage.
//!
//! This crate provides:
//!
//! - **`ConnectorConfig`**: JSON config file with environment overrides
//! - **`CredentialFile`**: Owner-only credentials file that seeds a connector
//!   and follows its refresh/revoke events
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use quickledger_store::{ConnectorConfig, CredentialFile};
//!
//! let config = ConnectorConfig::load(&ConnectorConfig::default_path()).await?;
//! let file = CredentialFile::default_location();
//!
//! let connector = Connector::builder(config.to_settings()?)
//!     .initializer(file.clone())
//!     .build()?;
//!
//! // Keep the file current as tokens rotate.
//! tokio::spawn({
//!     let events = connector.subscribe();
//!     async move { file.persist_events(events).await }
//! });
//! ```

pub mod config;
pub mod credential_file;
pub mod error;
pub mod persistence;

pub use config::ConnectorConfig;
pub use credential_file::CredentialFile;
pub use error::StoreError;
pub use persistence::{
    default_config_dir, default_config_path, default_credentials_path, load_json,
    load_json_if_exists, remove_file, save_json,
};
