//! Text output formatting.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use quickledger_core::RegistryEntry;
use serde_json::Value;

use super::json::{RevokeOutput, TokenOutput};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the registry as a table.
    pub fn format_entities(&self, entries: &[&RegistryEntry]) -> String {
        let mut lines = Vec::with_capacity(entries.len() + 4);

        lines.push(self.bold(&format!(
            "{:<34} {:<28} {:<7} {}",
            "Handle", "Fragment", "Kind", "Ops"
        )));
        lines.push("─".repeat(78));

        for entry in entries {
            lines.push(format!(
                "{:<34} {:<28} {:<7} {}",
                entry.handle,
                entry.fragment,
                entry.kind().to_string(),
                self.dim(&entry.capabilities.flags())
            ));
        }

        let reports = entries.iter().filter(|e| e.is_report()).count();
        lines.push(String::new());
        lines.push(format!(
            "Total: {} ({} entities, {} reports)",
            entries.len(),
            entries.len() - reports,
            reports
        ));

        lines.join("\n")
    }

    /// Formats the outcome of a token grant.
    pub fn format_tokens(&self, tokens: &TokenOutput) -> String {
        let mut lines = vec![self.green("Tokens saved")];

        if let Some(realm) = &tokens.realm_id {
            lines.push(format!("  Company:         {realm}"));
        }
        if let Some(at) = tokens.access_token_expires_at {
            lines.push(format!("  Access token:    expires {}", format_time(at)));
        }
        if let Some(at) = tokens.refresh_token_expires_at {
            lines.push(format!("  Refresh token:   expires {}", format_time(at)));
        }

        lines.join("\n")
    }

    /// Formats the outcome of a revocation.
    pub fn format_revoke(&self, output: &RevokeOutput) -> String {
        if output.revoked {
            self.green("Refresh token revoked")
        } else {
            self.yellow("No refresh token stored; nothing to revoke")
        }
    }

    /// Formats an API response: a one-line summary when the shape is known,
    /// then the body.
    pub fn format_value(&self, value: &Value) -> Result<String> {
        let body = serde_json::to_string_pretty(value)?;
        Ok(match summarize(value) {
            Some(summary) => format!("{}\n{body}", self.bold(&summary)),
            None => body,
        })
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// One-line description of query and report responses.
pub(crate) fn summarize(value: &Value) -> Option<String> {
    if let Some(response) = value.get("QueryResponse").and_then(Value::as_object) {
        let (entity, count) = response
            .iter()
            .find_map(|(key, records)| records.as_array().map(|r| (key.as_str(), r.len())))?;
        let noun = if count == 1 { "record" } else { "records" };
        return Some(format!("{entity}: {count} {noun}"));
    }

    let header = value.get("Header")?;
    let name = header.get("ReportName")?.as_str()?;
    match (
        header.get("StartPeriod").and_then(Value::as_str),
        header.get("EndPeriod").and_then(Value::as_str),
    ) {
        (Some(start), Some(end)) => Some(format!("{name} ({start} to {end})")),
        _ => Some(name.to_string()),
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
