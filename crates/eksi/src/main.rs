//! eksi - command-line client for the Eksi Sozluk API
//!
//! Main entry point for the eksi CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{call, entry, feed, me, operations, token, topic};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// eksi - command-line client for the Eksi Sozluk API
#[derive(Parser)]
#[command(name = "eksi")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// API base URI (or the address of an eksi-proxy)
    #[arg(
        long,
        global = true,
        env = "EKSI_URI",
        default_value = "https://api.eksisozluk.com"
    )]
    pub uri: String,

    /// Application client secret
    #[arg(long, global = true, env = "EKSI_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// API version path segment
    #[arg(long, global = true, default_value = "v1")]
    pub api_version: String,

    /// Account nick to log in with
    #[arg(short, long, global = true, env = "EKSI_USERNAME")]
    pub username: Option<String>,

    /// Account password (prompted for when absent)
    #[arg(long, global = true, env = "EKSI_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Request an access token and print the grant
    Token(token::TokenArgs),

    /// Log in and show the authenticated account
    Me(me::MeArgs),

    /// Show one entry
    Entry(entry::EntryArgs),

    /// Show a page of a topic
    Topic(topic::TopicArgs),

    /// Show a feed (popular, today, debe)
    Feed(feed::FeedArgs),

    /// Invoke any catalog operation by name
    Call(call::CallArgs),

    /// List catalog operations
    Operations(operations::OperationsArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "eksi=debug,eksi_client=debug,info"
    } else {
        "eksi=info,eksi_client=warn,warn"
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let ctx = commands::Context {
        uri: cli.uri,
        client_secret: cli.client_secret,
        api_version: cli.api_version,
        username: cli.username,
        password: cli.password,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Token(args) => token::run(args, &ctx).await,
        Commands::Me(args) => me::run(args, &ctx).await,
        Commands::Entry(args) => entry::run(args, &ctx).await,
        Commands::Topic(args) => topic::run(args, &ctx).await,
        Commands::Feed(args) => feed::run(args, &ctx).await,
        Commands::Call(args) => call::run(args, &ctx).await,
        Commands::Operations(args) => operations::run(args, &ctx),
    }
}
