//! Forwarding proxy that puts the Eksi Sozluk API behind permissive CORS.
//!
//! Browsers cannot call the API directly because it sends no CORS headers.
//! This crate relays requests to the API and adds the headers on the way
//! back.
//!
//! ```no_run
//! use eksi_proxy::{ProxyConfig, ProxyServer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = ProxyServer::new(ProxyConfig::default())?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod forward;
pub mod hooks;
pub mod server;

pub use config::{DEFAULT_DESTINATION, DEFAULT_PORT, ProxyConfig, ProxyRoute, find_route};
pub use error::{HookError, ProxyError, Result};
pub use forward::Forwarder;
pub use hooks::{CorsHeaders, ForwardRequest, ForwardResponse, RequestHook, ResponseHook};
pub use server::ProxyServer;
