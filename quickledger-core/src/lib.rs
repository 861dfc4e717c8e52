// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `QuickLedger` Core
//!
//! Core types, models, and traits for the `QuickLedger` connector.
//!
//! This crate provides the foundational abstractions used across all other
//! `QuickLedger` crates, including:
//!
//! - Domain models (credentials, endpoints, registry entries)
//! - Error types shared by the request executor and the token manager
//! - Fault envelope parsing for client-side API errors
//! - The credential initializer trait
//!
//! ## Key Types
//!
//! ### Credentials
//! - [`Credentials`] - Access token, refresh token, and realm id (each optional)
//! - [`TokenSet`] - Credentials plus the expiry metadata of a token grant
//! - [`Endpoints`] - OAuth2 endpoints from the discovery document
//! - [`ConnectorEvent`] - Refresh/revocation notifications
//!
//! ### Registry
//! - [`RegistryEntry`] - One remote entity or report
//! - [`Capabilities`] - Which operations an entry supports
//!
//! ### Errors
//! - [`ApiError`] / [`ApiErrorKind`] - Remote failures with payload and correlation id
//! - [`CredentialsError`] - Local misconfiguration or a failed grant

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::{ApiError, ApiErrorKind, CredentialsError};

// Re-export all model types
pub use models::{
    // Credential types
    ConnectorEvent,
    Credentials,
    Endpoints,
    TokenSet,
    // Registry types
    Capabilities,
    EntityKind,
    RegistryEntry,
    // Fault envelope
    Fault,
    FaultError,
    explain_fault,
};

// Re-export traits
pub use traits::CredentialInitializer;
