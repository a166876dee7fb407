//! Topics API.

use crate::catalog::{Endpoint, Params};
use crate::client::EksiClient;
use crate::error::Result;
use crate::types::ApiResponse;

/// Topics API client.
pub struct TopicsApi {
    client: EksiClient,
}

impl TopicsApi {
    pub(crate) fn new(client: EksiClient) -> Self {
        Self { client }
    }

    /// Entries of a topic, oldest first. Page defaults to 1.
    pub async fn get(&self, id: u64, page: Option<u32>) -> Result<ApiResponse> {
        let params = Params::new().with("id", id).maybe_page(page);
        self.client.invoke(Endpoint::Topic, &params).await
    }

    /// Most liked entries of a topic.
    pub async fn popular(&self, id: u64, page: Option<u32>) -> Result<ApiResponse> {
        let params = Params::new().with("id", id).maybe_page(page);
        self.client.invoke(Endpoint::TopicPopular, &params).await
    }
}
