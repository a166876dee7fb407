//! Users API.

use crate::catalog::{Endpoint, Params};
use crate::client::EksiClient;
use crate::error::Result;
use crate::types::ApiResponse;

/// Users API client.
pub struct UsersApi {
    client: EksiClient,
}

impl UsersApi {
    pub(crate) fn new(client: EksiClient) -> Self {
        Self { client }
    }

    /// Get a user's profile.
    pub async fn get(&self, nick: &str) -> Result<ApiResponse> {
        self.client
            .invoke(Endpoint::User, &Params::new().with("nick", nick))
            .await
    }

    /// Get the authenticated user's profile.
    pub async fn me(&self) -> Result<ApiResponse> {
        self.client.invoke(Endpoint::Me, &Params::new()).await
    }

    /// Entries written by `nick`. Page defaults to 1.
    pub async fn entries(&self, nick: &str, page: Option<u32>) -> Result<ApiResponse> {
        let params = Params::new().with("nick", nick).maybe_page(page);
        self.client.invoke(Endpoint::UserEntries, &params).await
    }

    /// Entries written by the authenticated user. Page defaults to 1.
    pub async fn my_entries(&self, page: Option<u32>) -> Result<ApiResponse> {
        self.client
            .invoke(Endpoint::MyEntries, &Params::new().maybe_page(page))
            .await
    }

    /// Entries favorited by `nick`.
    pub async fn favorites(&self, nick: &str, page: Option<u32>) -> Result<ApiResponse> {
        let params = Params::new().with("nick", nick).maybe_page(page);
        self.client.invoke(Endpoint::UserFavorites, &params).await
    }

    pub async fn follow(&self, nick: &str) -> Result<ApiResponse> {
        self.nick_action(Endpoint::Follow, nick).await
    }

    pub async fn unfollow(&self, nick: &str) -> Result<ApiResponse> {
        self.nick_action(Endpoint::Unfollow, nick).await
    }

    pub async fn block(&self, nick: &str) -> Result<ApiResponse> {
        self.nick_action(Endpoint::Block, nick).await
    }

    pub async fn unblock(&self, nick: &str) -> Result<ApiResponse> {
        self.nick_action(Endpoint::Unblock, nick).await
    }

    async fn nick_action(&self, endpoint: Endpoint, nick: &str) -> Result<ApiResponse> {
        self.client
            .invoke(endpoint, &Params::new().with("nick", nick))
            .await
    }
}
