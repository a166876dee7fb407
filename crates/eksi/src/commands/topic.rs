//! Topic command - fetches a page of a topic.

use anyhow::Result;
use clap::Args;

use super::{Context, print_response};

/// Arguments for the topic command.
#[derive(Args, Debug)]
pub struct TopicArgs {
    /// Topic id
    pub id: u64,

    /// Page number
    #[arg(short, long)]
    pub page: Option<u32>,

    /// Show the topic's popular entries instead
    #[arg(long)]
    pub popular: bool,
}

/// Run the topic command.
pub async fn run(args: TopicArgs, ctx: &Context) -> Result<()> {
    let (client, _) = ctx.login().await?;
    let topics = client.topics();
    let response = if args.popular {
        topics.popular(args.id, args.page).await?
    } else {
        topics.get(args.id, args.page).await?
    };
    print_response(&response, ctx)
}
