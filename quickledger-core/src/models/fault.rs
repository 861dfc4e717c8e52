//! Fault envelope returned by the API for client-side failures.
//!
//! ```json
//! {
//!   "Fault": {
//!     "Error": [
//!       { "Message": "Invalid query", "Detail": "QueryParserError: ...", "code": "4000" }
//!     ],
//!     "type": "ValidationFault"
//!   },
//!   "time": "2024-01-01T00:00:00.000-08:00"
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// Envelope Types
// ============================================================================

/// The `Fault` object.
#[derive(Debug, Clone, Deserialize)]
pub struct Fault {
    /// Individual errors.
    #[serde(rename = "Error", default)]
    pub errors: Vec<FaultError>,
    /// Fault type, e.g. `ValidationFault`.
    #[serde(rename = "type", default)]
    pub fault_type: Option<String>,
}

/// One entry of `Fault.Error`.
#[derive(Debug, Clone, Deserialize)]
pub struct FaultError {
    /// Error code. Sent as a string, occasionally as a number.
    #[serde(default)]
    pub code: Value,
    /// Short message.
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
    /// Detailed description.
    #[serde(rename = "Detail", default)]
    pub detail: Option<String>,
}

impl FaultError {
    /// Returns the code as text.
    pub fn code(&self) -> String {
        match &self.code {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Guidance for well-known codes.
    pub fn recommendation(&self) -> Option<&'static str> {
        match self.code().as_str() {
            "500" | "2010" => {
                Some("possible misconfiguration the entity name is not recognized.")
            }
            "4000" => Some(
                "check your query, including punctuation etc. For example, you might be using double quotes instead of single quotes.",
            ),
            "4001" => Some(
                "check your entity and attribute names to make sure they match QuickBooks API specifications.",
            ),
            _ => None,
        }
    }

    fn explain(&self) -> String {
        let detail = self.detail.as_deref().unwrap_or_default();
        match self.recommendation() {
            Some(hint) => format!("\nError code {}. {detail}. Recommendation: {hint}", self.code()),
            None => format!("\nError code {}. {detail}.", self.code()),
        }
    }
}

impl Fault {
    /// Extracts the `Fault` object from a response body.
    pub fn from_body(body: &Value) -> Option<Self> {
        let fault = body.get("Fault")?;
        serde_json::from_value(fault.clone()).ok()
    }
}

// ============================================================================
// Explanation
// ============================================================================

/// Builds a human-readable explanation of a Fault-shaped body.
///
/// Returns `None` when the body carries no Fault errors.
pub fn explain_fault(body: &Value) -> Option<String> {
    let fault = Fault::from_body(body)?;
    let explain: String = fault.errors.iter().map(FaultError::explain).collect();
    if explain.is_empty() { None } else { Some(explain) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_explain_query_syntax() {
        let body = json!({
            "Fault": {
                "Error": [{"Message": "Invalid query", "Detail": "QueryParserError", "code": "4000"}],
                "type": "ValidationFault"
            }
        });

        let explain = explain_fault(&body).unwrap();
        assert!(explain.contains("Error code 4000. QueryParserError."));
        assert!(explain.contains("check your query"));
    }

    #[test]
    fn test_explain_concatenates_errors() {
        let body = json!({
            "Fault": {
                "Error": [
                    {"Detail": "Unknown entity", "code": "2010"},
                    {"Detail": "Property Foo", "code": "4001"},
                    {"Detail": "Something else", "code": 6000}
                ]
            }
        });

        let explain = explain_fault(&body).unwrap();
        assert!(explain.contains("entity name is not recognized"));
        assert!(explain.contains("check your entity and attribute names"));
        assert!(explain.ends_with("\nError code 6000. Something else."));
    }

    #[test]
    fn test_no_fault() {
        assert!(explain_fault(&json!({"error": "invalid_grant"})).is_none());
        assert!(explain_fault(&json!({"Fault": {"Error": []}})).is_none());
        assert!(explain_fault(&Value::Null).is_none());
    }
}
