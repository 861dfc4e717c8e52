//! Report command - run a report with parameters.

use anyhow::{Result, bail};
use clap::Args;
use quickledger_entities::CallOptions;
use quickledger_fetch::QueryParams;

use super::{Session, print_value};
use crate::Cli;

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    /// Report handle, e.g. `ProfitAndLossReport`.
    pub handle: String,

    /// Report parameter as `key=value`. Repeatable.
    #[arg(long = "param", short, value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

/// Runs the report command.
pub async fn run(args: &ReportArgs, cli: &Cli) -> Result<()> {
    let params: QueryParams = args.params.iter().cloned().collect();

    let mut session = Session::open(cli).await?;
    let query = &session.api.report(&args.handle)?.query;

    let result = query
        .call(&params, &CallOptions::default())
        .await
        .map_err(anyhow::Error::from);
    let value = session.finish(result).await?;
    print_value(&value, cli)
}

fn parse_param(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected key=value, got {raw:?}");
    };
    if key.trim().is_empty() {
        bail!("parameter name is empty in {raw:?}");
    }
    Ok((key.trim().to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("start_date=2024-01-01").unwrap(),
            ("start_date".to_string(), "2024-01-01".to_string())
        );
        assert_eq!(
            parse_param("columns=a=b").unwrap(),
            ("columns".to_string(), "a=b".to_string())
        );
        assert!(parse_param("no-equals").is_err());
        assert!(parse_param("=value").is_err());
    }
}
