//! Typed wrappers over the endpoint catalog.

mod entries;
mod feeds;
mod topics;
mod users;

pub use entries::EntriesApi;
pub use feeds::FeedsApi;
pub use topics::TopicsApi;
pub use users::UsersApi;
