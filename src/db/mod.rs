mod repository;
mod schema;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{GeneratedContent, NewsItem};

pub use repository::Repository;

/// The table of news items the desk reads from and publishes to.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Every item, newest first.
    async fn list_items(&self) -> Result<Vec<NewsItem>>;

    /// The oldest item still waiting for copy that has a raw draft.
    async fn next_pending_item(&self) -> Result<Option<NewsItem>>;

    /// Overwrite `hook`, `body` and `faqs` of the item with `id`.
    async fn update_content(&self, id: i64, content: &GeneratedContent) -> Result<()>;
}
