use async_trait::async_trait;

use crate::block::Block;
use crate::error::ApiError;

/// Metadata for a page about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    pub parent_id: String,
    pub title: String,
    pub icon: Option<String>,
}

/// Reference to a page the content API created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    pub id: String,
    pub url: Option<String>,
}

impl PageRef {
    /// The API's URL for the page, or one derived from its id.
    pub fn url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| format!("https://notion.so/{}", self.id.replace('-', "")))
    }
}

/// Write operations of the remote page store.
///
/// Calls are not idempotent: repeating a create makes a second page, and
/// repeating an append attaches the blocks again.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Create a page under `page.parent_id` with `children` as its first blocks.
    async fn create_page(&self, page: &PageSpec, children: &[Block]) -> Result<PageRef, ApiError>;

    /// Append `children` after the last block of `page_id`.
    async fn append_children(&self, page_id: &str, children: &[Block]) -> Result<(), ApiError>;

    /// Move a page to the trash.
    async fn archive_page(&self, page_id: &str) -> Result<(), ApiError>;
}
