//! Entries API.

use crate::catalog::{Endpoint, Params};
use crate::client::EksiClient;
use crate::error::Result;
use crate::types::{ApiResponse, Vote};

/// Entries API client.
pub struct EntriesApi {
    client: EksiClient,
}

impl EntriesApi {
    pub(crate) fn new(client: EksiClient) -> Self {
        Self { client }
    }

    /// Get an entry by ID.
    pub async fn get(&self, id: u64) -> Result<ApiResponse> {
        self.client
            .invoke(Endpoint::Entry, &Params::new().with("id", id))
            .await
    }

    /// Vote an entry up or down.
    pub async fn vote(&self, id: u64, vote: Vote) -> Result<ApiResponse> {
        let params = Params::new().with("id", id).with("rate", vote.rate());
        self.client.invoke(Endpoint::Vote, &params).await
    }

    pub async fn favorite(&self, id: u64) -> Result<ApiResponse> {
        self.client
            .invoke(Endpoint::Favorite, &Params::new().with("id", id))
            .await
    }

    pub async fn unfavorite(&self, id: u64) -> Result<ApiResponse> {
        self.client
            .invoke(Endpoint::Unfavorite, &Params::new().with("id", id))
            .await
    }
}
