//! Record commands - get, query, create, update, delete.

use anyhow::Result;
use clap::Args;
use quickledger_entities::CallOptions;
use tracing::info;

use super::{PayloadArgs, Session, print_value};
use crate::Cli;

/// Arguments for the get command.
#[derive(Args)]
pub struct GetArgs {
    /// Entity handle, e.g. `Invoice`.
    pub handle: String,

    /// Record id.
    pub id: String,
}

/// Arguments for the query command.
#[derive(Args)]
pub struct QueryArgs {
    /// Entity handle, e.g. `Customer`.
    pub handle: String,

    /// Select statement. Defaults to `select * from <Entity>`.
    pub statement: Option<String>,
}

/// Arguments for create, update, and delete.
#[derive(Args)]
pub struct WriteArgs {
    /// Entity handle, e.g. `Vendor`.
    pub handle: String,

    #[command(flatten)]
    pub payload: PayloadArgs,

    /// Idempotency key, sent as `requestid`.
    #[arg(long)]
    pub reqid: Option<String>,
}

/// Which write to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// `POST /{fragment}`.
    Create,
    /// Sparse or full update.
    Update,
    /// Delete by id and sync token.
    Delete,
}

/// Runs the get command.
pub async fn get(args: &GetArgs, cli: &Cli) -> Result<()> {
    let mut session = Session::open(cli).await?;
    let read = session.api.accounting(&args.handle)?.reader()?;

    let result = read
        .call(&args.id, &CallOptions::default())
        .await
        .map_err(anyhow::Error::from);
    let value = session.finish(result).await?;
    print_value(&value, cli)
}

/// Runs the query command.
pub async fn query(args: &QueryArgs, cli: &Cli) -> Result<()> {
    let mut session = Session::open(cli).await?;
    let query = session.api.accounting(&args.handle)?.querier()?;

    let result = query
        .call(args.statement.as_deref(), &CallOptions::default())
        .await
        .map_err(anyhow::Error::from);
    let value = session.finish(result).await?;
    print_value(&value, cli)
}

/// Runs create, update, or delete.
pub async fn write(op: WriteOp, args: &WriteArgs, cli: &Cli) -> Result<()> {
    let payload = args.payload.read().await?;
    let opts = CallOptions {
        reqid: args.reqid.clone(),
        minor_version: None,
    };

    let mut session = Session::open(cli).await?;
    let entity = session.api.accounting(&args.handle)?;
    info!(entity = entity.name(), ?op, "Writing record");

    let result = match op {
        WriteOp::Create => entity.creator()?.call(&payload, &opts).await,
        WriteOp::Update => entity.updater()?.call(&payload, &opts).await,
        WriteOp::Delete => entity.deleter()?.call(&payload, &opts).await,
    }
    .map_err(anyhow::Error::from);
    let value = session.finish(result).await?;
    print_value(&value, cli)
}
