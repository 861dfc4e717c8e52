//! Batch command - post a batch payload verbatim.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::{PayloadArgs, Session, print_value};
use crate::Cli;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
}

/// Runs the batch command.
pub async fn run(args: &BatchArgs, cli: &Cli) -> Result<()> {
    let payload = args.payload.read().await?;
    let items = payload
        .get("BatchItemRequest")
        .and_then(|items| items.as_array())
        .map_or(0, Vec::len);
    info!(items, "Posting batch");

    let mut session = Session::open(cli).await?;
    let result = session.api.batch(&payload).await.map_err(anyhow::Error::from);
    let value = session.finish(result).await?;
    print_value(&value, cli)
}
