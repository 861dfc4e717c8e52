//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use quickledger_core::{Capabilities, EntityKind, RegistryEntry, TokenSet};
use serde::{Serialize, Serializer};

// ============================================================================
// Output Types
// ============================================================================

/// A registry entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityOutput {
    pub handle: &'static str,
    pub name: &'static str,
    pub fragment: &'static str,
    pub kind: EntityKind,
    pub flags: String,
    pub capabilities: Capabilities,
}

impl From<&RegistryEntry> for EntityOutput {
    fn from(entry: &RegistryEntry) -> Self {
        Self {
            handle: entry.handle,
            name: entry.name,
            fragment: entry.fragment,
            kind: entry.kind(),
            flags: entry.capabilities.flags(),
            capabilities: entry.capabilities,
        }
    }
}

/// Result of a token grant. Tokens themselves are never printed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(serialize_with = "serialize_datetime")]
    pub issued_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub access_token_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
}

impl From<&TokenSet> for TokenOutput {
    fn from(tokens: &TokenSet) -> Self {
        Self {
            realm_id: tokens.credentials.realm_id.clone(),
            token_type: tokens.token_type.clone(),
            issued_at: tokens.issued_at,
            access_token_expires_at: tokens.access_token_expires_at(),
            refresh_token_expires_at: tokens.refresh_token_expires_at(),
        }
    }
}

/// Result of a revocation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeOutput {
    /// A revocation request was sent.
    pub revoked: bool,
    /// Raw response text from the revocation endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

// ============================================================================
// Serialization helpers
// ============================================================================

fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

#[allow(clippy::ref_option)]
fn serialize_datetime_opt<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => s.serialize_str(&dt.to_rfc3339()),
        None => s.serialize_none(),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats registry entries.
    pub fn format_entities(&self, entries: &[&RegistryEntry]) -> Result<String> {
        let outputs: Vec<EntityOutput> = entries.iter().map(|e| EntityOutput::from(*e)).collect();
        self.format(&outputs)
    }
}
