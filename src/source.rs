//! Data store interface consumed by the node registry and the schema

use async_trait::async_trait;

use crate::entities::{Menu, Page, Post, Postmeta, Setting, SiteOption, User};
use crate::pagination::Ordered;

/// Opaque error raised by a content source
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of a content source call
pub type FetchResult<T> = std::result::Result<T, BoxError>;

/// Content store backing the graph
///
/// Fetch-by-id methods receive the local ID exactly as it was decoded from
/// the global ID; the store decides whether it is well formed. `Ok(None)`
/// means not found and must not be used to hide a failure.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn user(&self, id: &str) -> FetchResult<Option<User>>;

    /// The user the current request acts as
    async fn viewer(&self) -> FetchResult<Option<User>>;

    /// Public site settings (singleton)
    async fn settings(&self) -> FetchResult<Setting>;

    async fn option(&self, id: &str) -> FetchResult<Option<SiteOption>>;

    async fn options(&self) -> FetchResult<Ordered<SiteOption>>;

    async fn page(&self, id: &str) -> FetchResult<Option<Page>>;

    async fn post(&self, id: &str) -> FetchResult<Option<Post>>;

    /// Look up a post of any type by its slug
    async fn post_by_name(&self, name: &str) -> FetchResult<Option<Post>>;

    async fn posts(&self, post_type: &str) -> FetchResult<Ordered<Post>>;

    async fn postmeta(&self, id: &str) -> FetchResult<Option<Postmeta>>;

    async fn postmeta_for_post(&self, post_id: i64) -> FetchResult<Ordered<Postmeta>>;

    async fn menu(&self, id: &str) -> FetchResult<Option<Menu>>;

    async fn menu_by_name(&self, name: &str) -> FetchResult<Option<Menu>>;
}
