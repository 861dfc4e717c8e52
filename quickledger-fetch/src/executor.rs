//! Request executor.
//!
//! Every API call goes through [`Connector::execute`]:
//!
//! 1. make sure credentials are complete (initializer at most once)
//! 2. build headers, body, and the company-scoped URL
//! 3. send, record the correlation id
//! 4. classify the status
//! 5. on the first 401 refresh the access token and go back to 2
//!
//! A second 401 is final. Nothing else is retried.

use quickledger_core::{ApiError, ApiErrorKind, CredentialsError, explain_fault};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::connector::Connector;
use crate::error::{ConnectorError, TransportError};
use crate::query::{QueryParams, with_query};
use crate::transport::{HttpRequest, HttpResponse};

/// Content type of JSON bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Content type of form bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

// ============================================================================
// Request Options
// ============================================================================

/// Per-call options for [`Connector::execute`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Replaces the default header set entirely, including `Authorization`.
    pub headers: Option<HeaderMap>,
    /// Entity name, for logging.
    pub entity_name: Option<String>,
}

impl RequestOptions {
    /// Options tagged with an entity name.
    pub fn for_entity(name: impl Into<String>) -> Self {
        Self {
            headers: None,
            entity_name: Some(name.into()),
        }
    }
}

/// Outcome of one attempt that did not succeed.
enum Failure {
    /// HTTP 401. Never leaves this module.
    Unauthorized {
        body: String,
        correlation_id: Option<String>,
    },
    Fatal(ConnectorError),
}

macro_rules! fatal_from {
    ($($err:ty),+) => {
        $(impl From<$err> for Failure {
            fn from(err: $err) -> Self {
                Self::Fatal(err.into())
            }
        })+
    };
}

fatal_from!(ApiError, CredentialsError, TransportError, serde_json::Error);

// ============================================================================
// Execute
// ============================================================================

impl Connector {
    /// Sends one API request and returns the parsed JSON body.
    ///
    /// `path` is relative to `/v3/company/{realm_id}` and starts with `/`.
    /// A 2xx with an empty body yields `Value::Null`.
    #[instrument(
        skip(self, query, body, options),
        fields(method = %method, path = %path, entity = options.entity_name.as_deref().unwrap_or("-"))
    )]
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &QueryParams,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<Value, ConnectorError> {
        self.credentials
            .ensure_complete(self.initializer.as_deref())
            .await?;

        let mut attempt: u32 = 0;
        loop {
            match self.attempt(&method, path, query, body, options).await {
                Ok(value) => return Ok(value),
                Err(Failure::Fatal(err)) => return Err(err),
                Err(Failure::Unauthorized { correlation_id, .. }) if attempt == 0 => {
                    debug!(attempt, "Unauthorized, refreshing access token before retry");
                    if let Err(err) = self.get_access_token(None, None).await {
                        warn!(
                            correlation_id = correlation_id.as_deref().unwrap_or("-"),
                            error = %err,
                            "Token refresh after 401 failed"
                        );
                        return Err(err.or_correlation_id(correlation_id.as_deref()));
                    }
                    attempt += 1;
                }
                Err(Failure::Unauthorized {
                    body,
                    correlation_id,
                }) => {
                    warn!(attempt, "Unauthorized after token refresh");
                    return Err(ApiError::new(
                        ApiErrorKind::Unauthorized,
                        "Client Error (HTTP 401) Unauthorized after refreshing the access token.",
                    )
                    .with_payload(Value::String(body))
                    .with_correlation_id(correlation_id)
                    .into());
                }
            }
        }
    }

    async fn attempt(
        &self,
        method: &Method,
        path: &str,
        query: &QueryParams,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<Value, Failure> {
        let credentials = self.credentials.snapshot().await;
        let (Some(access_token), Some(realm_id)) = (credentials.access_token, credentials.realm_id)
        else {
            return Err(CredentialsError::new("Missing credentials.").into());
        };

        let headers = match &options.headers {
            Some(headers) => headers.clone(),
            None => self.default_headers(&access_token)?,
        };
        let body = body.map(|b| serialize_body(&headers, b)).transpose()?;

        let base = format!(
            "{}/v3/company/{}{}",
            self.settings.effective_base_url(),
            urlencoding::encode(&realm_id),
            path
        );
        let url = with_query(&base, query);

        debug!(url = %url, "Sending request");
        let response = self
            .transport
            .send(HttpRequest {
                method: method.clone(),
                url: url.clone(),
                headers,
                body,
            })
            .await?;

        let correlation_id = self.record_correlation_id(&response).await;
        debug!(status = %response.status, correlation_id = ?correlation_id, "Classifying response");
        classify(method, &url, response, correlation_id)
    }

    fn default_headers(&self, access_token: &str) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.settings.user_agent)
                .map_err(|_| TransportError::InvalidHeader("user-agent"))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {access_token}"))
                .map_err(|_| TransportError::InvalidHeader("authorization"))?,
        );
        Ok(headers)
    }
}

/// Form bodies are sent as the raw string; everything else is JSON-encoded.
fn serialize_body(headers: &HeaderMap, body: &Value) -> Result<String, serde_json::Error> {
    let is_form = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with(FORM_CONTENT_TYPE));

    match body {
        Value::String(raw) if is_form => Ok(raw.clone()),
        _ => serde_json::to_string(body),
    }
}

// ============================================================================
// Classification
// ============================================================================

fn classify(
    method: &Method,
    url: &str,
    response: HttpResponse,
    correlation_id: Option<String>,
) -> Result<Value, Failure> {
    let status = response.status;
    let text = response.body;

    if status.is_success() {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        return Ok(serde_json::from_str(&text)?);
    }

    let error = match status {
        StatusCode::UNAUTHORIZED => {
            return Err(Failure::Unauthorized {
                body: text,
                correlation_id,
            });
        }
        StatusCode::NOT_FOUND => ApiError::new(
            ApiErrorKind::NotFound,
            "Resource not found. Recommendation: check resource is supported or base URL configuration.",
        )
        .with_payload(Value::String(format!("{method} {url}"))),
        StatusCode::TOO_MANY_REQUESTS => {
            ApiError::new(ApiErrorKind::Throttled, "API request limit reached.")
                .with_payload(Value::String(text))
        }
        s if s.is_client_error() => {
            let payload = serde_json::from_str(&text).unwrap_or(Value::String(text));
            let explain = explain_fault(&payload).unwrap_or_else(|| payload.to_string());
            ApiError::new(
                ApiErrorKind::Client { status: s.as_u16() },
                format!("Client Error (HTTP {}) {explain}", s.as_u16()),
            )
            .with_payload(payload)
        }
        s if s.is_server_error() => ApiError::new(
            ApiErrorKind::Server { status: s.as_u16() },
            format!("Server Error (HTTP {})", s.as_u16()),
        )
        .with_payload(serde_json::from_str::<Value>(&text).ok()),
        // 1xx/3xx: no special handling.
        _ => {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)));
        }
    };

    Err(error.with_correlation_id(correlation_id).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: body.to_string(),
        }
    }

    fn classify_err(status: u16, body: &str) -> ApiError {
        match classify(&Method::GET, "https://h/v3/company/1/x", response(status, body), Some("tid".into())) {
            Err(Failure::Fatal(ConnectorError::Api(err))) => err,
            _ => panic!("expected an API error for {status}"),
        }
    }

    #[test]
    fn test_success_bodies() {
        let ok = classify(&Method::GET, "u", response(200, r#"{"a":1}"#), None);
        assert_eq!(ok.ok(), Some(json!({"a": 1})));

        let empty = classify(&Method::GET, "u", response(204, ""), None);
        assert_eq!(empty.ok(), Some(Value::Null));

        let invalid = classify(&Method::GET, "u", response(200, "<html>"), None);
        assert!(matches!(invalid, Err(Failure::Fatal(ConnectorError::InvalidJson(_)))));
    }

    #[test]
    fn test_redirect_passthrough() {
        let moved = classify(&Method::GET, "u", response(302, ""), None);
        assert_eq!(moved.ok(), Some(Value::Null));
    }

    #[test]
    fn test_unauthorized_is_internal() {
        let result = classify(&Method::GET, "u", response(401, "nope"), None);
        assert!(matches!(result, Err(Failure::Unauthorized { ref body, .. }) if body == "nope"));
    }

    #[test]
    fn test_not_found_payload() {
        let err = classify_err(404, "");
        assert!(err.is_not_found());
        assert_eq!(err.payload, Some(json!("GET https://h/v3/company/1/x")));
        assert_eq!(err.correlation_id.as_deref(), Some("tid"));
    }

    #[test]
    fn test_throttled_carries_text() {
        let err = classify_err(429, "slow down");
        assert!(err.is_throttling());
        assert_eq!(err.payload, Some(json!("slow down")));
    }

    #[test]
    fn test_fault_explanation() {
        let body = json!({"Fault": {"Error": [{"Detail": "bad quote", "code": "4000"}]}});
        let err = classify_err(400, &body.to_string());

        assert_eq!(err.status(), Some(400));
        assert!(err.message.starts_with("Client Error (HTTP 400) \nError code 4000. bad quote."));
        assert_eq!(err.payload, Some(body));
    }

    #[test]
    fn test_non_fault_client_error() {
        let err = classify_err(400, r#"{"error":"bad"}"#);
        assert_eq!(err.message, r#"Client Error (HTTP 400) {"error":"bad"}"#);

        let err = classify_err(403, "Forbidden");
        assert_eq!(err.payload, Some(json!("Forbidden")));
    }

    #[test]
    fn test_server_error_payload() {
        let err = classify_err(503, "Service Unavailable");
        assert_eq!(err.message, "Server Error (HTTP 503)");
        assert!(err.payload.is_none());

        let err = classify_err(500, r#"{"Fault":{}}"#);
        assert!(err.payload.is_some());
    }

    #[test]
    fn test_form_body_is_raw() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        assert_eq!(serialize_body(&headers, &json!("a=1&b=2")).unwrap(), "a=1&b=2");

        let json_headers = HeaderMap::new();
        assert_eq!(serialize_body(&json_headers, &json!("a=1")).unwrap(), "\"a=1\"");
    }
}
