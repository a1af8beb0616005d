mod generator;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::GeneratedContent;

pub use generator::GeminiGenerator;

/// Drafts a hook, article body and FAQ from a headline and its raw draft.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, title: &str, raw_draft: &str) -> Result<GeneratedContent>;
}
