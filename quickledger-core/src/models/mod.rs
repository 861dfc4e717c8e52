//! Domain models for `QuickLedger`.

mod credentials;
mod entity;
mod event;
mod fault;

pub use credentials::{Credentials, Endpoints, TokenSet};
pub use entity::{Capabilities, EntityKind, RegistryEntry};
pub use event::ConnectorEvent;
pub use fault::{Fault, FaultError, explain_fault};
