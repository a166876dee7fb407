//! Token command - performs the password grant and prints the result.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use eksi_client::Error;
use serde::Serialize;

use super::Context;

/// Arguments for the token command.
#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Print only the access token
    #[arg(short, long)]
    pub quiet: bool,
}

/// Grant for JSON output.
#[derive(Debug, Serialize)]
struct TokenOutput {
    access_token: String,
    token_type: Option<String>,
    expires_in: Option<u64>,
}

/// Run the token command.
pub async fn run(args: TokenArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let grant = match client.request_token(ctx.credentials()?).await {
        Ok(grant) => grant,
        Err(Error::Auth { status, body }) => {
            eprintln!("{} {}", style(format!("HTTP {}", status)).red(), body);
            anyhow::bail!("token request rejected");
        }
        Err(e) => return Err(e.into()),
    };

    if args.quiet {
        println!("{}", grant.access_token);
        return Ok(());
    }

    if ctx.json_output {
        let output = TokenOutput {
            access_token: grant.access_token,
            token_type: grant.token_type,
            expires_in: grant.expires_in,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!();
    println!("  {} {}", dim.apply_to("Access token:"), grant.access_token);
    if let Some(kind) = &grant.token_type {
        println!("  {} {}", dim.apply_to("Type:"), kind);
    }
    if let Some(expires_in) = grant.expires_in {
        println!("  {} {}s", dim.apply_to("Expires in:"), expires_in);
    }
    if ctx.verbose && !grant.extra.is_empty() {
        println!(
            "  {} {}",
            dim.apply_to("Other fields:"),
            serde_json::to_string(&grant.extra)?
        );
    }
    println!();
    Ok(())
}
