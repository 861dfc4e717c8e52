//! Accounting API: per-entity operations generated from the registry.
//!
//! [`AccountingApi::new`] walks the registry once and binds, for every
//! entry, only the operations its capabilities allow. An operation that is
//! not supported is simply `None`:
//!
//! ```ignore
//! let api = AccountingApi::new(connector);
//! let invoice = api.accounting("Invoice")?;
//! let created = invoice.create.as_ref().unwrap().call(&payload, &CallOptions::default()).await?;
//!
//! // Account has no delete.
//! assert!(api.accounting("Account")?.delete.is_none());
//! ```
//!
//! Every operation applies `requestid` from [`CallOptions::reqid`] and
//! `minorversion` from [`CallOptions::minor_version`], falling back to the
//! connector's default minor version.

use std::collections::HashMap;
use std::sync::Arc;

use quickledger_core::{EntityKind, RegistryEntry};
use quickledger_fetch::{Connector, ConnectorError, Method, QueryParams, RequestOptions};
use serde_json::Value;
use tracing::debug;

use crate::error::EntityError;
use crate::registry::EntityRegistry;

// ============================================================================
// Call Options & Requests
// ============================================================================

/// Per-call options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Idempotency key, sent as `requestid`.
    pub reqid: Option<String>,
    /// Minor version for this call, sent as `minorversion`.
    pub minor_version: Option<u32>,
}

impl CallOptions {
    /// Sets the request id.
    pub fn with_reqid(mut self, reqid: impl Into<String>) -> Self {
        self.reqid = Some(reqid.into());
        self
    }

    /// Sets the minor version.
    pub fn with_minor_version(mut self, minor_version: u32) -> Self {
        self.minor_version = Some(minor_version);
        self
    }
}

/// A fully resolved entity request, before it reaches the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the company URL.
    pub path: String,
    /// Query parameters.
    pub query: QueryParams,
    /// JSON body.
    pub body: Option<Value>,
}

/// An entry bound to a connector.
#[derive(Debug, Clone)]
struct Binding {
    entry: &'static RegistryEntry,
    connector: Arc<Connector>,
}

impl Binding {
    fn params(&self, opts: &CallOptions) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(reqid) = &opts.reqid {
            params.insert("requestid".into(), reqid.clone());
        }
        if let Some(minor) = opts.minor_version.or(self.connector.settings().minor_version) {
            params.insert("minorversion".into(), minor.to_string());
        }
        params
    }

    fn entity_path(&self) -> String {
        format!("/{}", self.entry.fragment)
    }

    async fn send(&self, request: EntityRequest) -> Result<Value, ConnectorError> {
        debug!(entity = self.entry.name, method = %request.method, path = %request.path, "Entity call");
        self.connector
            .execute(
                request.method,
                &request.path,
                &request.query,
                request.body.as_ref(),
                &RequestOptions::for_entity(self.entry.name),
            )
            .await
    }
}

// ============================================================================
// Operations
// ============================================================================

/// `POST /{fragment}`.
#[derive(Debug, Clone)]
pub struct Create(Binding);

impl Create {
    /// Builds the request.
    pub fn request(&self, payload: &Value, opts: &CallOptions) -> EntityRequest {
        EntityRequest {
            method: Method::POST,
            path: self.0.entity_path(),
            query: self.0.params(opts),
            body: Some(payload.clone()),
        }
    }

    /// Creates a record.
    pub async fn call(&self, payload: &Value, opts: &CallOptions) -> Result<Value, ConnectorError> {
        self.0.send(self.request(payload, opts)).await
    }
}

/// `GET /{fragment}/{id}`.
#[derive(Debug, Clone)]
pub struct Read(Binding);

impl Read {
    /// Builds the request. The id is percent-encoded.
    pub fn request(&self, id: &str, opts: &CallOptions) -> EntityRequest {
        EntityRequest {
            method: Method::GET,
            path: format!("{}/{}", self.0.entity_path(), urlencoding::encode(id)),
            query: self.0.params(opts),
            body: None,
        }
    }

    /// Reads a record by id.
    pub async fn call(&self, id: &str, opts: &CallOptions) -> Result<Value, ConnectorError> {
        self.0.send(self.request(id, opts)).await
    }
}

/// `POST /{fragment}?operation=update`.
#[derive(Debug, Clone)]
pub struct Update(Binding);

impl Update {
    /// Builds the request.
    pub fn request(&self, payload: &Value, opts: &CallOptions) -> EntityRequest {
        let mut query = self.0.params(opts);
        query.insert("operation".into(), "update".into());
        EntityRequest {
            method: Method::POST,
            path: self.0.entity_path(),
            query,
            body: Some(payload.clone()),
        }
    }

    /// Updates a record. The payload carries `Id` and `SyncToken`.
    pub async fn call(&self, payload: &Value, opts: &CallOptions) -> Result<Value, ConnectorError> {
        self.0.send(self.request(payload, opts)).await
    }
}

/// `POST /{fragment}?operation=delete`.
#[derive(Debug, Clone)]
pub struct Delete(Binding);

impl Delete {
    /// Builds the request.
    pub fn request(&self, payload: &Value, opts: &CallOptions) -> EntityRequest {
        let mut query = self.0.params(opts);
        query.insert("operation".into(), "delete".into());
        EntityRequest {
            method: Method::POST,
            path: self.0.entity_path(),
            query,
            body: Some(payload.clone()),
        }
    }

    /// Deletes a record. The payload carries `Id` and `SyncToken`.
    pub async fn call(&self, payload: &Value, opts: &CallOptions) -> Result<Value, ConnectorError> {
        self.0.send(self.request(payload, opts)).await
    }
}

/// `GET /query?query=...`.
#[derive(Debug, Clone)]
pub struct AccountingQuery(Binding);

impl AccountingQuery {
    /// Statement used when none is given.
    pub fn default_statement(&self) -> String {
        format!("select * from {}", self.0.entry.name)
    }

    /// Builds the request. The statement is passed through unchanged.
    pub fn request(&self, statement: Option<&str>, opts: &CallOptions) -> EntityRequest {
        let statement = statement
            .filter(|s| !s.trim().is_empty())
            .map_or_else(|| self.default_statement(), str::to_string);

        let mut query = self.0.params(opts);
        query.insert("query".into(), statement);
        EntityRequest {
            method: Method::GET,
            path: "/query".to_string(),
            query,
            body: None,
        }
    }

    /// Runs a query.
    pub async fn call(&self, statement: Option<&str>, opts: &CallOptions) -> Result<Value, ConnectorError> {
        self.0.send(self.request(statement, opts)).await
    }
}

/// `GET /reports/{fragment}?...`.
#[derive(Debug, Clone)]
pub struct ReportQuery(Binding);

impl ReportQuery {
    /// Builds the request. `params` pass through as the query string.
    pub fn request(&self, params: &QueryParams, opts: &CallOptions) -> EntityRequest {
        let mut query = params.clone();
        query.extend(self.0.params(opts));
        EntityRequest {
            method: Method::GET,
            path: format!("/reports/{}", self.0.entry.fragment),
            query,
            body: None,
        }
    }

    /// Runs the report.
    pub async fn call(&self, params: &QueryParams, opts: &CallOptions) -> Result<Value, ConnectorError> {
        self.0.send(self.request(params, opts)).await
    }
}

// ============================================================================
// Entity Handles
// ============================================================================

/// Operations of an accounting entity. Unsupported ones are `None`.
#[derive(Debug, Clone)]
pub struct AccountingEntity {
    /// Registry entry.
    pub entry: &'static RegistryEntry,
    /// Create, if supported.
    pub create: Option<Create>,
    /// Read by id, if supported.
    pub get: Option<Read>,
    /// Update, if supported.
    pub update: Option<Update>,
    /// Delete, if supported.
    pub delete: Option<Delete>,
    /// Select query, if supported.
    pub query: Option<AccountingQuery>,
}

impl AccountingEntity {
    fn bind(entry: &'static RegistryEntry, connector: &Arc<Connector>) -> Self {
        let caps = entry.capabilities;
        let binding = || Binding {
            entry,
            connector: Arc::clone(connector),
        };

        Self {
            entry,
            create: caps.create.then(|| Create(binding())),
            get: caps.read.then(|| Read(binding())),
            update: caps.update.then(|| Update(binding())),
            delete: caps.delete.then(|| Delete(binding())),
            query: caps.query.then(|| AccountingQuery(binding())),
        }
    }

    /// Name used in queries.
    pub fn name(&self) -> &'static str {
        self.entry.name
    }

    /// URL fragment.
    pub fn fragment(&self) -> &'static str {
        self.entry.fragment
    }

    /// Returns the create operation or [`EntityError::Unsupported`].
    pub fn creator(&self) -> Result<&Create, EntityError> {
        self.create.as_ref().ok_or_else(|| self.unsupported("create"))
    }

    /// Returns the read operation or [`EntityError::Unsupported`].
    pub fn reader(&self) -> Result<&Read, EntityError> {
        self.get.as_ref().ok_or_else(|| self.unsupported("read"))
    }

    /// Returns the update operation or [`EntityError::Unsupported`].
    pub fn updater(&self) -> Result<&Update, EntityError> {
        self.update.as_ref().ok_or_else(|| self.unsupported("update"))
    }

    /// Returns the delete operation or [`EntityError::Unsupported`].
    pub fn deleter(&self) -> Result<&Delete, EntityError> {
        self.delete.as_ref().ok_or_else(|| self.unsupported("delete"))
    }

    /// Returns the query operation or [`EntityError::Unsupported`].
    pub fn querier(&self) -> Result<&AccountingQuery, EntityError> {
        self.query.as_ref().ok_or_else(|| self.unsupported("query"))
    }

    fn unsupported(&self, operation: &'static str) -> EntityError {
        EntityError::Unsupported {
            handle: self.entry.handle.to_string(),
            operation,
        }
    }
}

/// Operations of a report.
#[derive(Debug, Clone)]
pub struct ReportEntity {
    /// Registry entry.
    pub entry: &'static RegistryEntry,
    /// Report query.
    pub query: ReportQuery,
}

/// One bound registry entry.
#[derive(Debug, Clone)]
pub enum EntityApi {
    /// Accounting entity.
    Accounting(AccountingEntity),
    /// Report.
    Report(ReportEntity),
}

impl EntityApi {
    /// Returns the registry entry.
    pub fn entry(&self) -> &'static RegistryEntry {
        match self {
            Self::Accounting(entity) => entity.entry,
            Self::Report(report) => report.entry,
        }
    }

    /// Returns the accounting handle, if this is one.
    pub fn as_accounting(&self) -> Option<&AccountingEntity> {
        match self {
            Self::Accounting(entity) => Some(entity),
            Self::Report(_) => None,
        }
    }

    /// Returns the report handle, if this is one.
    pub fn as_report(&self) -> Option<&ReportEntity> {
        match self {
            Self::Report(report) => Some(report),
            Self::Accounting(_) => None,
        }
    }
}

// ============================================================================
// Accounting API
// ============================================================================

/// Entry point to every entity and report.
#[derive(Debug, Clone)]
pub struct AccountingApi {
    connector: Arc<Connector>,
    entities: HashMap<&'static str, EntityApi>,
}

impl AccountingApi {
    /// Binds every registry entry to `connector`.
    pub fn new(connector: Arc<Connector>) -> Self {
        let entities = EntityRegistry::all()
            .iter()
            .map(|entry| {
                let api = if entry.is_report() {
                    EntityApi::Report(ReportEntity {
                        entry,
                        query: ReportQuery(Binding {
                            entry,
                            connector: Arc::clone(&connector),
                        }),
                    })
                } else {
                    EntityApi::Accounting(AccountingEntity::bind(entry, &connector))
                };
                (entry.handle, api)
            })
            .collect();

        Self { connector, entities }
    }

    /// Returns the connector.
    pub fn connector(&self) -> &Arc<Connector> {
        &self.connector
    }

    /// Gets an entity by exact handle.
    pub fn entity(&self, handle: &str) -> Option<&EntityApi> {
        self.entities.get(handle)
    }

    /// Gets an entity by handle, ignoring ASCII case.
    pub fn lookup(&self, handle: &str) -> Result<&EntityApi, EntityError> {
        EntityRegistry::find(handle)
            .and_then(|entry| self.entities.get(entry.handle))
            .ok_or_else(|| EntityError::UnknownHandle(handle.to_string()))
    }

    /// Gets an accounting entity by handle, ignoring ASCII case.
    pub fn accounting(&self, handle: &str) -> Result<&AccountingEntity, EntityError> {
        let api = self.lookup(handle)?;
        api.as_accounting().ok_or_else(|| EntityError::WrongKind {
            handle: api.entry().handle.to_string(),
            expected: EntityKind::Accounting,
        })
    }

    /// Gets a report by handle, ignoring ASCII case.
    pub fn report(&self, handle: &str) -> Result<&ReportEntity, EntityError> {
        let api = self.lookup(handle)?;
        api.as_report().ok_or_else(|| EntityError::WrongKind {
            handle: api.entry().handle.to_string(),
            expected: EntityKind::Report,
        })
    }

    /// Builds a batch request: `POST /batch`, no query string.
    pub fn batch_request(payload: &Value) -> EntityRequest {
        EntityRequest {
            method: Method::POST,
            path: "/batch".to_string(),
            query: QueryParams::new(),
            body: Some(payload.clone()),
        }
    }

    /// Posts a batch payload verbatim.
    pub async fn batch(&self, payload: &Value) -> Result<Value, ConnectorError> {
        let request = Self::batch_request(payload);
        self.connector
            .execute(
                request.method,
                &request.path,
                &request.query,
                request.body.as_ref(),
                &RequestOptions::default(),
            )
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
