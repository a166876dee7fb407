//! eksi-proxy - CORS forwarding proxy for the Eksi Sozluk API
//!
//! Main entry point for the proxy server.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use eksi_proxy::{DEFAULT_PORT, ProxyConfig, ProxyServer};

/// CORS forwarding proxy for the Eksi Sozluk API
#[derive(Parser)]
#[command(name = "eksi-proxy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Port to listen on [default: 9000]
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Route table (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "eksi_proxy=debug,tower_http=debug,info"
    } else {
        "eksi_proxy=info,warn"
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
    if cli.json_logs {
        tracing_subscriber::registry()
            .with(fmt_layer.json().with_filter(env_filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt_layer.with_filter(env_filter))
            .init();
    }

    let (file_port, routes) = match &cli.config {
        Some(path) => {
            let (port, routes) = ProxyConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            (port, Some(routes))
        }
        None => (None, None),
    };

    // Command line / PORT first, then the config file.
    let port = cli.port.or(file_port).unwrap_or(DEFAULT_PORT);
    let bind_addr = SocketAddr::new(cli.host, port);

    let config = match routes {
        Some(routes) => ProxyConfig::new(bind_addr, routes)?,
        None => ProxyConfig::default().with_bind_addr(bind_addr),
    };

    let server = ProxyServer::new(config)?;
    server
        .run()
        .await
        .with_context(|| format!("failed to serve on {}", bind_addr))?;

    Ok(())
}
