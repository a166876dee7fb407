//! Feeds API.

use crate::catalog::{Endpoint, Params};
use crate::client::EksiClient;
use crate::error::Result;
use crate::types::ApiResponse;

/// Feeds API client.
pub struct FeedsApi {
    client: EksiClient,
}

impl FeedsApi {
    pub(crate) fn new(client: EksiClient) -> Self {
        Self { client }
    }

    pub async fn popular(&self, page: Option<u32>) -> Result<ApiResponse> {
        self.paged(Endpoint::FeedPopular, page).await
    }

    pub async fn today(&self, page: Option<u32>) -> Result<ApiResponse> {
        self.paged(Endpoint::FeedToday, page).await
    }

    /// "Dünün en beğenilen entry'leri": a single, unpaginated list.
    pub async fn debe(&self) -> Result<ApiResponse> {
        self.client.invoke(Endpoint::FeedDebe, &Params::new()).await
    }

    /// Search topic titles.
    pub async fn search(&self, keywords: &str, page: Option<u32>) -> Result<ApiResponse> {
        let params = Params::new().with("keywords", keywords).maybe_page(page);
        self.client.invoke(Endpoint::Search, &params).await
    }

    async fn paged(&self, endpoint: Endpoint, page: Option<u32>) -> Result<ApiResponse> {
        self.client
            .invoke(endpoint, &Params::new().maybe_page(page))
            .await
    }
}
