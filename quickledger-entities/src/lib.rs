// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `QuickLedger` Entities
//!
//! The entity registry and the accounting API built from it.
//!
//! ## Registry (62 entries)
//!
//! | Group | Examples | Operations |
//! |-------|----------|------------|
//! | Transactions | Bill, Invoice, Payment, `JournalEntry` | create, read, update, delete, query |
//! | Lists | Account, Customer, Item, Vendor | mostly create, read, update, query |
//! | Supporting | Attachable, `CompanyInfo`, Preferences | varies |
//! | Reports | `ProfitAndLossReport`, `BalanceSheetReport` | report query |
//!
//! ## Usage
//!
//! ```ignore
//! use quickledger_entities::{AccountingApi, CallOptions};
//!
//! let api = AccountingApi::new(Arc::new(connector));
//! let customers = api
//!     .accounting("Customer")?
//!     .querier()?
//!     .call(Some("select * from Customer maxresults 10"), &CallOptions::default())
//!     .await?;
//! ```

pub mod api;
pub mod error;
pub mod registry;

// Re-export key types
pub use api::{
    AccountingApi, AccountingEntity, AccountingQuery, CallOptions, Create, Delete, EntityApi,
    EntityRequest, Read, ReportEntity, ReportQuery, Update,
};
pub use error::EntityError;
pub use registry::EntityRegistry;
