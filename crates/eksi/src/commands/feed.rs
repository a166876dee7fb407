//! Feed command - fetches one of the index feeds.

use anyhow::Result;
use clap::{Args, ValueEnum};

use super::{Context, print_response};

/// Which feed to fetch.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Popular,
    Today,
    Debe,
}

/// Arguments for the feed command.
#[derive(Args, Debug)]
pub struct FeedArgs {
    /// Feed to fetch
    #[arg(value_enum)]
    pub kind: FeedKind,

    /// Page number (ignored for debe)
    #[arg(short, long)]
    pub page: Option<u32>,
}

/// Run the feed command.
pub async fn run(args: FeedArgs, ctx: &Context) -> Result<()> {
    let (client, _) = ctx.login().await?;
    let feeds = client.feeds();
    let response = match args.kind {
        FeedKind::Popular => feeds.popular(args.page).await?,
        FeedKind::Today => feeds.today(args.page).await?,
        FeedKind::Debe => feeds.debe().await?,
    };
    print_response(&response, ctx)
}
