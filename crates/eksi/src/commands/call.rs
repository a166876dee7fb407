//! Call command - dispatches any catalog operation by name.

use anyhow::{Context as _, Result};
use clap::Args;
use eksi_client::{Endpoint, Params};

use super::{Context, print_response};

/// Arguments for the call command.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// Operation name (see `eksi operations`)
    pub operation: String,

    /// Parameter as key=value (repeatable)
    #[arg(short = 'P', long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

fn parse_param(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Run the call command.
pub async fn run(args: CallArgs, ctx: &Context) -> Result<()> {
    let endpoint: Endpoint = args
        .operation
        .parse()
        .with_context(|| format!("unknown operation '{}'", args.operation))?;
    let params: Params = args.params.into_iter().collect();

    let client = if endpoint.descriptor().requires_auth {
        ctx.login().await?.0
    } else {
        ctx.client()?
    };

    let response = client.invoke(endpoint, &params).await?;
    print_response(&response, ctx)
}
