// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `QuickLedger` Fetch
//!
//! Request execution and OAuth2 token management for the `QuickLedger`
//! connector.
//!
//! ## Connector
//!
//! - [`Connector`] - Owns settings, credentials, cached endpoints, and the event channel
//! - [`ConnectorBuilder`] - Validates settings and wires an initializer or custom transport
//! - [`ConnectorSettings`] - App identity, environment, defaults
//!
//! ## Request Executor
//!
//! [`Connector::execute`] sends one company-scoped request, classifies the
//! response into [`quickledger_core::ApiError`] kinds, and retries exactly
//! once after refreshing the access token on HTTP 401.
//!
//! ## Token Manager
//!
//! - [`Connector::load_discovery`] - Cached OAuth2 discovery
//! - [`Connector::get_access_token`] - Authorization-code and refresh grants
//! - [`Connector::revoke`] - Disconnect
//! - [`Connector::authorization_url`] - Consent URL
//!
//! ## Example
//!
//! ```ignore
//! use quickledger_fetch::{Connector, ConnectorSettings, QueryParams, RequestOptions};
//! use reqwest::Method;
//!
//! let connector = Connector::builder(ConnectorSettings::new(id, secret, redirect))
//!     .credentials(Credentials::new(access, refresh, realm))
//!     .build()?;
//!
//! let mut query = QueryParams::new();
//! query.insert("query".into(), "select * from Customer".into());
//! let result = connector
//!     .execute(Method::GET, "/query", &query, None, &RequestOptions::default())
//!     .await?;
//! ```

pub mod connector;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod oauth;
pub mod query;
pub mod settings;
pub mod transport;

// Re-export key types at crate root

// Errors
pub use error::{ConnectorError, TransportError};

// Connector
pub use connector::{CORRELATION_HEADER, Connector, ConnectorBuilder};
pub use credentials::CredentialStore;
pub use executor::RequestOptions;
pub use settings::ConnectorSettings;

// Transport & encoding
pub use query::{QueryParams, encode_query, with_query};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

// HTTP types used in the public API
pub use reqwest::Method;
pub use reqwest::header::HeaderMap;
