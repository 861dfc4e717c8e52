// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `QuickLedger` CLI - the QuickBooks Online Accounting API from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Send the user to the consent screen
//! quickledger auth url --state xyz
//!
//! # Exchange the code from the redirect
//! quickledger auth exchange --code AB11... --realm 4620816365
//!
//! # List entities and reports
//! quickledger entities --kind report
//!
//! # Read, query, write
//! quickledger get Invoice 130
//! quickledger query Customer "select * from Customer where Active = true"
//! quickledger create Vendor --data '{"DisplayName": "Acme"}' --reqid r-1
//!
//! # Reports
//! quickledger report ProfitAndLossReport --param start_date=2024-01-01
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use quickledger_fetch::ConnectorError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{auth, batch, entities, records, report};

// ============================================================================
// CLI Definition
// ============================================================================

/// `QuickLedger` CLI - QuickBooks Online Accounting API client.
#[derive(Parser)]
#[command(name = "quickledger")]
#[command(about = "QuickBooks Online Accounting API client")]
#[command(long_about = r#"
QuickLedger talks to the QuickBooks Online v3 Accounting API.

The app identity (client id, secret, redirect URI) is read from the config
file or from QUICKLEDGER_* environment variables. Tokens live in a separate
credentials file that is updated whenever they are refreshed.

Examples:
  quickledger auth url --state xyz        # Consent URL
  quickledger auth exchange --code C --realm R
  quickledger entities                    # Registry listing
  quickledger query Invoice               # select * from Invoice
  quickledger report BalanceSheetReport   # Run a report
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Credentials file path.
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Use the sandbox environment.
    #[arg(long, global = true)]
    pub sandbox: bool,

    /// Minor version to send with entity calls.
    #[arg(long, global = true)]
    pub minor_version: Option<u32>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Authorize, refresh, or disconnect.
    Auth(auth::AuthArgs),

    /// List registry entries.
    #[command(visible_alias = "e")]
    Entities(entities::EntitiesArgs),

    /// Read a record by id.
    Get(records::GetArgs),

    /// Run a select query.
    #[command(visible_alias = "q")]
    Query(records::QueryArgs),

    /// Create a record.
    Create(records::WriteArgs),

    /// Update a record.
    Update(records::WriteArgs),

    /// Delete a record.
    Delete(records::WriteArgs),

    /// Run a report.
    #[command(visible_alias = "r")]
    Report(report::ReportArgs),

    /// Post a batch request.
    Batch(batch::BatchArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// Any failure.
    Error = 1,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("quickledger=debug,info")
    } else {
        EnvFilter::new("quickledger=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Auth(args) => auth::run(args, &cli).await,
        Commands::Entities(args) => entities::run(args, &cli),
        Commands::Get(args) => records::get(args, &cli).await,
        Commands::Query(args) => records::query(args, &cli).await,
        Commands::Create(args) => records::write(records::WriteOp::Create, args, &cli).await,
        Commands::Update(args) => records::write(records::WriteOp::Update, args, &cli).await,
        Commands::Delete(args) => records::write(records::WriteOp::Delete, args, &cli).await,
        Commands::Report(args) => report::run(args, &cli).await,
        Commands::Batch(args) => batch::run(args, &cli).await,
    };

    let code = match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            if !cli.quiet {
                report_error(&e, cli.verbose);
            }
            ExitCode::Error
        }
    };
    std::process::exit(code as i32);
}

/// Prints an error, with the server correlation id when there is one.
fn report_error(error: &anyhow::Error, verbose: bool) {
    eprintln!("Error: {error:#}");

    let Some(connector_error) = error.chain().find_map(|c| c.downcast_ref::<ConnectorError>()) else {
        return;
    };
    if let Some(id) = connector_error.correlation_id() {
        eprintln!("Correlation id: {id}");
    }
    if verbose {
        if let Some(payload) = connector_error.as_api().and_then(|api| api.payload.as_ref()) {
            eprintln!("Payload: {payload}");
        }
    }
}
