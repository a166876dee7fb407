//! Client for the Eksi Sozluk private REST API.
//!
//! The client exchanges a username and password for a bearer token (OAuth
//! password grant), binds the resulting identity to its [`Session`], and then
//! dispatches named operations from a fixed [`catalog`].
//!
//! # Example
//!
//! ```no_run
//! use eksi_client::{Credentials, EksiClient, Endpoint, Params, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = EksiClient::builder()
//!     .uri("https://api.eksisozluk.com")
//!     .client_secret("app-secret")
//!     .build()?;
//!
//! // No request has been sent yet.
//! let session = client.authenticate(Credentials::new("nick", "password")).await?;
//! println!("Authenticated as {} ({})", session.nick, session.user_id);
//!
//! // Typed helpers...
//! let entry = client.entries().get(12345).await?;
//! println!("{} {}", entry.status, entry.text());
//!
//! // ...or dispatch by name.
//! let feed = client
//!     .invoke_named("feed_today", &Params::new().page(2))
//!     .await?;
//! println!("{}", feed.text());
//!
//! let _ = client.invoke(Endpoint::FeedDebe, &Params::new()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Users**: profiles, authored and favorited entries, follow/block
//! - **Entries**: fetch, vote, favorite
//! - **Topics**: entries and popular entries, paginated
//! - **Feeds**: popular, today, debe, search

pub mod api;
pub mod catalog;
pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use catalog::{Endpoint, EndpointDescriptor, HttpMethod, Params, PreparedRequest};
pub use client::{ClientBuilder, EksiClient};
pub use error::{Error, Result};
pub use session::Session;
pub use types::*;
