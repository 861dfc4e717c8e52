//! Entities command - list the registry.

use anyhow::Result;
use clap::{Args, ValueEnum};
use quickledger_core::RegistryEntry;
use quickledger_entities::EntityRegistry;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the entities command.
#[derive(Args)]
pub struct EntitiesArgs {
    /// Only list one kind.
    #[arg(long, short)]
    pub kind: Option<KindFilter>,
}

/// Registry kind filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindFilter {
    /// Accounting entities.
    Accounting,
    /// Reports.
    Report,
}

/// Runs the entities command. No network access.
pub fn run(args: &EntitiesArgs, cli: &Cli) -> Result<()> {
    let entries = select(args.kind);

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_entities(&entries));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_entities(&entries)?);
        }
    }

    Ok(())
}

fn select(kind: Option<KindFilter>) -> Vec<&'static RegistryEntry> {
    match kind {
        None => EntityRegistry::all().iter().collect(),
        Some(KindFilter::Accounting) => EntityRegistry::accounting(),
        Some(KindFilter::Report) => EntityRegistry::reports(),
    }
}
