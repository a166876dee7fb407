//! Entry command - fetches a single entry.

use anyhow::Result;
use clap::Args;

use super::{Context, print_response};

/// Arguments for the entry command.
#[derive(Args, Debug)]
pub struct EntryArgs {
    /// Entry id
    pub id: u64,
}

/// Run the entry command.
pub async fn run(args: EntryArgs, ctx: &Context) -> Result<()> {
    let (client, _) = ctx.login().await?;
    let response = client.entries().get(args.id).await?;
    print_response(&response, ctx)
}
