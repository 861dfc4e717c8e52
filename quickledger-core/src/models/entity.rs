//! Registry entry models.
//!
//! A registry entry describes one remote resource: its handle, the name the
//! query language uses for it, the URL fragment, and the operations the
//! remote API supports for it.

use serde::Serialize;
use std::fmt;

// ============================================================================
// Capabilities
// ============================================================================

/// Operations supported by a registry entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// POST a new record.
    pub create: bool,
    /// GET a record by id.
    pub read: bool,
    /// POST with `operation=update`.
    pub update: bool,
    /// POST with `operation=delete`.
    pub delete: bool,
    /// Accounting-style `select` query.
    pub query: bool,
    /// Report-style parameterized query.
    pub report: bool,
}

impl Capabilities {
    /// Create, read, update, delete, and query.
    pub const CRUD: Self = Self::accounting(true, true, true, true, true);

    /// Report-only capabilities.
    pub const REPORT: Self = Self {
        create: false,
        read: false,
        update: false,
        delete: false,
        query: false,
        report: true,
    };

    /// Builds accounting capabilities (never a report).
    pub const fn accounting(query: bool, create: bool, read: bool, update: bool, delete: bool) -> Self {
        Self {
            create,
            read,
            update,
            delete,
            query,
            report: false,
        }
    }

    /// Short flags string, e.g. `CRUDQ-`.
    pub fn flags(&self) -> String {
        [
            (self.create, 'C'),
            (self.read, 'R'),
            (self.update, 'U'),
            (self.delete, 'D'),
            (self.query, 'Q'),
            (self.report, 'P'),
        ]
        .iter()
        .map(|&(on, c)| if on { c } else { '-' })
        .collect()
    }
}

// ============================================================================
// Entity Kind
// ============================================================================

/// Whether an entry is a transactional/list entity or a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Accounting entity (CRUD + select query).
    Accounting,
    /// Report (parameterized GET under `/reports`).
    Report,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accounting => write!(f, "entity"),
            Self::Report => write!(f, "report"),
        }
    }
}

// ============================================================================
// Registry Entry
// ============================================================================

/// One entry of the static entity registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    /// Unique lookup key.
    pub handle: &'static str,
    /// Name used by the remote query language and report titles.
    pub name: &'static str,
    /// URL fragment appended to the company path.
    pub fragment: &'static str,
    /// Supported operations.
    pub capabilities: Capabilities,
}

impl RegistryEntry {
    /// Creates an accounting entry whose name equals its handle.
    pub const fn accounting(handle: &'static str, fragment: &'static str, capabilities: Capabilities) -> Self {
        Self {
            handle,
            name: handle,
            fragment,
            capabilities,
        }
    }

    /// Creates a report entry.
    pub const fn report(handle: &'static str, name: &'static str, fragment: &'static str) -> Self {
        Self {
            handle,
            name,
            fragment,
            capabilities: Capabilities::REPORT,
        }
    }

    /// Returns the entry kind.
    pub fn kind(&self) -> EntityKind {
        if self.capabilities.report {
            EntityKind::Report
        } else {
            EntityKind::Accounting
        }
    }

    /// Returns true if this entry is a report.
    pub fn is_report(&self) -> bool {
        self.kind() == EntityKind::Report
    }
}
