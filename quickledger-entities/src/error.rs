//! Entity lookup errors.

use quickledger_core::EntityKind;
use thiserror::Error;

/// A handle could not be resolved to the requested operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntityError {
    /// No registry entry has this handle.
    #[error("Unknown entity: {0}")]
    UnknownHandle(String),

    /// The entry exists but is of the other kind.
    #[error("{handle} is not of kind {expected}")]
    WrongKind {
        /// Entry handle.
        handle: String,
        /// Kind the caller asked for.
        expected: EntityKind,
    },

    /// The remote API does not support this operation for the entry.
    #[error("{handle} does not support {operation}")]
    Unsupported {
        /// Entry handle.
        handle: String,
        /// Operation name.
        operation: &'static str,
    },
}
