//! Auth command - authorize, refresh, and disconnect.

use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;

use super::Session;
use crate::output::{JsonFormatter, RevokeOutput, TextFormatter, TokenOutput};
use crate::{Cli, OutputFormat};

/// Arguments for the auth command.
#[derive(Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub action: AuthAction,
}

/// Auth subcommands.
#[derive(Subcommand)]
pub enum AuthAction {
    /// Print the consent URL.
    Url {
        /// Opaque value returned on the redirect.
        #[arg(long)]
        state: String,
    },

    /// Exchange an authorization code for tokens.
    Exchange {
        /// Code from the redirect.
        #[arg(long)]
        code: String,

        /// Company id (`realmId`) from the redirect.
        #[arg(long)]
        realm: String,
    },

    /// Refresh the access token.
    Refresh,

    /// Revoke the refresh token and forget stored credentials.
    Revoke,
}

/// Runs the auth command.
pub async fn run(args: &AuthArgs, cli: &Cli) -> Result<()> {
    let mut session = Session::open(cli).await?;

    match &args.action {
        AuthAction::Url { state } => {
            let url = session.connector().authorization_url(state).await?;
            match cli.format {
                OutputFormat::Text => println!("{url}"),
                OutputFormat::Json => {
                    let formatter = JsonFormatter::new(cli.pretty);
                    println!("{}", formatter.format(&serde_json::json!({ "url": url }))?);
                }
            }
            Ok(())
        }
        AuthAction::Exchange { code, realm } => {
            info!(realm = %realm, "Exchanging authorization code");
            let result = session
                .connector()
                .get_access_token(Some(code.as_str()), Some(realm.as_str()))
                .await
                .map_err(anyhow::Error::from);
            let tokens = session.finish(result).await?;
            print_tokens(&TokenOutput::from(&tokens), cli)
        }
        AuthAction::Refresh => {
            let result = session
                .connector()
                .get_access_token(None, None)
                .await
                .map_err(anyhow::Error::from);
            let tokens = session.finish(result).await?;
            print_tokens(&TokenOutput::from(&tokens), cli)
        }
        AuthAction::Revoke => {
            let result = session.connector().revoke().await.map_err(anyhow::Error::from);
            let response = session.finish(result).await?;
            let output = RevokeOutput {
                revoked: response.is_some(),
                response,
            };
            match cli.format {
                OutputFormat::Text => {
                    let formatter = TextFormatter::new(!cli.no_color);
                    println!("{}", formatter.format_revoke(&output));
                }
                OutputFormat::Json => {
                    let formatter = JsonFormatter::new(cli.pretty);
                    println!("{}", formatter.format(&output)?);
                }
            }
            Ok(())
        }
    }
}

fn print_tokens(output: &TokenOutput, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_tokens(output));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(output)?);
        }
    }
    Ok(())
}
