//! Token manager: discovery, token grants, revocation, authorization URL.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use quickledger_core::{
    ApiError, ApiErrorKind, ConnectorEvent, Credentials, CredentialsError, Endpoints, TokenSet,
    explain_fault,
};
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::connector::Connector;
use crate::error::{ConnectorError, TransportError};
use crate::executor::{FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
use crate::query::{QueryParams, encode_query};
use crate::transport::HttpRequest;

/// Grant type of an authorization-code exchange.
const AUTHORIZATION_CODE: &str = "authorization_code";

/// Grant type of a refresh.
const REFRESH_TOKEN: &str = "refresh_token";

// ============================================================================
// Wire Types
// ============================================================================

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    x_refresh_token_expires_in: Option<i64>,
    #[serde(rename = "realmId", default)]
    realm_id: Option<String>,
}

// ============================================================================
// Token Manager
// ============================================================================

impl Connector {
    /// Returns the OAuth2 endpoints, fetching the discovery document once.
    ///
    /// The result is cached for the lifetime of the connector.
    #[instrument(skip(self))]
    pub async fn load_discovery(&self) -> Result<Endpoints, ConnectorError> {
        if let Some(endpoints) = self.endpoints.read().await.clone() {
            return Ok(endpoints);
        }

        let url = self.settings.effective_discovery_url().to_string();
        debug!(url = %url, "Loading discovery document");

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        let response = self
            .transport
            .send(HttpRequest {
                method: Method::GET,
                url: url.clone(),
                headers,
                body: None,
            })
            .await
            .map_err(|e| discovery_error(format!("Unable to load discovery document from {url}: {e}")))?;

        if !response.status.is_success() {
            return Err(discovery_error(format!(
                "Unable to load discovery document from {url} (HTTP {}).",
                response.status.as_u16()
            ))
            .with_payload(Value::String(response.body))
            .into());
        }

        let endpoints: Endpoints = serde_json::from_str(&response.body)
            .map_err(|e| discovery_error(format!("Invalid discovery document from {url}: {e}")))?;

        *self.endpoints.write().await = Some(endpoints.clone());
        Ok(endpoints)
    }

    /// Performs a token grant and merges the result into the store.
    ///
    /// With `code`, this is an authorization-code exchange; without, a
    /// refresh-token grant using the stored refresh token.
    ///
    /// The realm id is `realm_id` if given, else the stored one, unless the
    /// token endpoint returns its own `realmId`, which wins.
    #[instrument(skip(self, code), fields(grant = if code.is_some() { AUTHORIZATION_CODE } else { REFRESH_TOKEN }))]
    pub async fn get_access_token(
        &self,
        code: Option<&str>,
        realm_id: Option<&str>,
    ) -> Result<TokenSet, ConnectorError> {
        let endpoints = self.load_discovery().await?;
        let stored = self.credentials.snapshot().await;

        let mut form = QueryParams::new();
        let grant_type = if let Some(code) = code {
            form.insert("code".into(), code.to_string());
            form.insert("redirect_uri".into(), self.settings.redirect_uri.clone());
            AUTHORIZATION_CODE
        } else {
            let Some(refresh_token) = stored.refresh_token.clone().filter(|t| !t.is_empty()) else {
                return Err(CredentialsError::new(
                    "Missing refresh token. Authorize the connection before refreshing.",
                )
                .into());
            };
            form.insert("refresh_token".into(), refresh_token);
            REFRESH_TOKEN
        };
        form.insert("grant_type".into(), grant_type.to_string());

        let mut headers = self.basic_auth_headers()?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));

        let response = self
            .transport
            .send(HttpRequest {
                method: Method::POST,
                url: endpoints.token_endpoint.clone(),
                headers,
                body: Some(encode_query(&form)),
            })
            .await?;
        let correlation_id = self.record_correlation_id(&response).await;

        if !response.status.is_success() {
            let payload = serde_json::from_str(&response.body).unwrap_or(Value::String(response.body));
            let explain = explain_fault(&payload).unwrap_or_else(|| payload.to_string());
            warn!(status = response.status.as_u16(), "Token grant rejected");
            return Err(CredentialsError::new(format!(
                "Unsuccessful {grant_type} grant. (HTTP-{}): {explain}",
                response.status.as_u16()
            ))
            .with_payload(payload)
            .with_correlation_id(correlation_id)
            .into());
        }

        let token: TokenResponse = serde_json::from_str(&response.body)?;

        let realm = token
            .realm_id
            .or_else(|| realm_id.map(str::to_string))
            .or(stored.realm_id);
        self.credentials
            .set(&Credentials {
                access_token: token.access_token,
                refresh_token: token.refresh_token,
                realm_id: realm,
            })
            .await;

        let token_set = TokenSet {
            credentials: self.credentials.snapshot().await,
            token_type: token.token_type,
            expires_in: token.expires_in,
            x_refresh_token_expires_in: token.x_refresh_token_expires_in,
            issued_at: Utc::now(),
        };
        info!(expires_in = ?token_set.expires_in, "Token grant succeeded");

        self.emit(ConnectorEvent::CredentialsRefreshed(token_set.clone()));
        Ok(token_set)
    }

    /// Revokes the refresh token (disconnects the app from the company).
    ///
    /// Runs the initializer first, when configured, so the freshest token is
    /// revoked. Returns `None` when there is no refresh token to revoke.
    /// A rejected revocation is logged, not returned as an error.
    #[instrument(skip(self))]
    pub async fn revoke(&self) -> Result<Option<String>, ConnectorError> {
        let endpoints = self.load_discovery().await?;

        if let Some(initializer) = &self.initializer {
            if let Some(initial) = initializer.initial_credentials().await? {
                self.credentials.set(&initial).await;
            }
        }

        let Some(refresh_token) = self
            .credentials
            .snapshot()
            .await
            .refresh_token
            .filter(|t| !t.is_empty())
        else {
            debug!("No refresh token, nothing to revoke");
            return Ok(None);
        };

        let mut headers = self.basic_auth_headers()?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

        let response = self
            .transport
            .send(HttpRequest {
                method: Method::POST,
                url: endpoints.revocation_endpoint.clone(),
                headers,
                body: Some(json!({ "token": refresh_token }).to_string()),
            })
            .await?;
        self.record_correlation_id(&response).await;

        if response.status.is_success() {
            info!("Refresh token revoked");
            self.emit(ConnectorEvent::CredentialsRevoked(response.body.clone()));
        } else {
            warn!(
                status = response.status.as_u16(),
                body = %response.body,
                "Token revocation failed"
            );
        }
        Ok(Some(response.body))
    }

    /// Builds the URL that sends a user to the consent screen.
    ///
    /// `state` comes back verbatim on the redirect.
    #[instrument(skip(self, state))]
    pub async fn authorization_url(&self, state: &str) -> Result<String, ConnectorError> {
        let endpoints = self.load_discovery().await?;

        let mut params = QueryParams::new();
        params.insert("client_id".into(), self.settings.client_id.clone());
        params.insert("scope".into(), self.settings.scope.clone());
        params.insert("redirect_uri".into(), self.settings.redirect_uri.clone());
        params.insert("response_type".into(), "code".into());
        params.insert("state".into(), state.to_string());

        Ok(format!("{}?{}", endpoints.authorization_endpoint, encode_query(&params)))
    }

    fn basic_auth_headers(&self) -> Result<HeaderMap, TransportError> {
        let basic = STANDARD.encode(format!(
            "{}:{}",
            self.settings.client_id, self.settings.client_secret
        ));

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.settings.user_agent)
                .map_err(|_| TransportError::InvalidHeader("user-agent"))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {basic}"))
                .map_err(|_| TransportError::InvalidHeader("authorization"))?,
        );
        Ok(headers)
    }
}

fn discovery_error(message: String) -> ApiError {
    ApiError::new(ApiErrorKind::Discovery, message)
}
