use tracing::{info, warn};

use crate::api::{ContentApi, PageRef, PageSpec};
use crate::block::Block;
use crate::config::MAX_CHUNK_SIZE;
use crate::error::PublishError;

/// Split blocks into consecutive chunks of at most `size` blocks.
///
/// Chunk 0 carries the page creation call, so an empty document still yields
/// one (empty) chunk. A table is one block however many rows it has.
pub fn chunks(blocks: &[Block], size: usize) -> Vec<&[Block]> {
    let size = size.clamp(1, MAX_CHUNK_SIZE);
    if blocks.is_empty() {
        return vec![blocks];
    }
    blocks.chunks(size).collect()
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPage {
    pub page_id: String,
    pub url: String,
    /// Write calls made by this run.
    pub chunks_sent: usize,
    /// Blocks attached by this run.
    pub blocks_sent: usize,
}

/// Sends a parsed document to the content API one chunk at a time.
///
/// Each call is awaited before the next is issued, since the remote page only
/// supports appending at the end.
pub struct Publisher<A> {
    api: A,
    chunk_size: usize,
}

impl<A: ContentApi> Publisher<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            chunk_size: MAX_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Create a page holding the first chunk, then append the rest in order.
    pub async fn publish(
        &self,
        page: &PageSpec,
        blocks: &[Block],
    ) -> Result<PublishedPage, PublishError> {
        let chunks = chunks(blocks, self.chunk_size);
        let first = chunks.first().copied().unwrap_or_default();

        let created = self
            .api
            .create_page(page, first)
            .await
            .map_err(PublishError::create)?;
        info!(
            page_id = %created.id,
            title = %page.title,
            blocks = first.len(),
            "created page"
        );

        let appended = self.append_from(&created.id, &chunks, 1).await?;

        Ok(PublishedPage {
            url: created.url(),
            page_id: created.id,
            chunks_sent: 1 + appended.chunks,
            blocks_sent: first.len() + appended.blocks,
        })
    }

    /// Archive `old_page_id`, then publish a fresh page.
    ///
    /// A failed archive aborts before anything is created. Nothing guards
    /// against a retried replace creating a second page.
    pub async fn replace(
        &self,
        old_page_id: &str,
        page: &PageSpec,
        blocks: &[Block],
    ) -> Result<PublishedPage, PublishError> {
        self.api
            .archive_page(old_page_id)
            .await
            .map_err(|source| PublishError::Archive {
                page_id: old_page_id.to_string(),
                source,
            })?;
        info!(page_id = %old_page_id, "archived page");

        self.publish(page, blocks).await
    }

    /// Append chunks `from_chunk..` of `blocks` to an existing page, picking
    /// up after a failed [`publish`](Self::publish).
    pub async fn resume(
        &self,
        page_id: &str,
        blocks: &[Block],
        from_chunk: usize,
    ) -> Result<PublishedPage, PublishError> {
        let chunks = chunks(blocks, self.chunk_size);
        if from_chunk == 0 || from_chunk >= chunks.len() {
            return Err(PublishError::ChunkOutOfRange {
                chunk_index: from_chunk,
                chunks: chunks.len(),
            });
        }

        let appended = self.append_from(page_id, &chunks, from_chunk).await?;
        let page = PageRef {
            id: page_id.to_string(),
            url: None,
        };

        Ok(PublishedPage {
            url: page.url(),
            page_id: page.id,
            chunks_sent: appended.chunks,
            blocks_sent: appended.blocks,
        })
    }

    async fn append_from(
        &self,
        page_id: &str,
        chunks: &[&[Block]],
        start: usize,
    ) -> Result<Appended, PublishError> {
        let mut appended = Appended::default();

        for (chunk_index, chunk) in chunks.iter().enumerate().skip(start) {
            if let Err(source) = self.api.append_children(page_id, chunk).await {
                let attached: usize = chunks[..chunk_index].iter().map(|c| c.len()).sum();
                warn!(
                    page_id,
                    chunk_index,
                    attached,
                    error = %source,
                    "append failed; page is partially published"
                );
                return Err(PublishError::Append {
                    page_id: page_id.to_string(),
                    chunk_index,
                    appended_blocks: attached,
                    source,
                });
            }
            info!(page_id, chunk_index, blocks = chunk.len(), "appended blocks");
            appended.chunks += 1;
            appended.blocks += chunk.len();
        }

        Ok(appended)
    }
}

#[derive(Debug, Default)]
struct Appended {
    chunks: usize,
    blocks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Span;
    use crate::error::ApiError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create { title: String, blocks: Vec<Block> },
        Append { page_id: String, blocks: Vec<Block> },
        Archive { page_id: String },
    }

    /// Records calls and fails the call with index `fail_at`, if set.
    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<Call>>,
        fail_at: Option<usize>,
    }

    impl RecordingApi {
        fn failing_at(call: usize) -> Self {
            Self {
                fail_at: Some(call),
                ..Self::default()
            }
        }

        fn record(&self, call: Call) -> Result<(), ApiError> {
            let mut calls = self.calls.lock().unwrap();
            if self.fail_at == Some(calls.len()) {
                return Err(ApiError::status(500, "internal error"));
            }
            calls.push(call);
            Ok(())
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContentApi for RecordingApi {
        async fn create_page(
            &self,
            page: &PageSpec,
            children: &[Block],
        ) -> Result<PageRef, ApiError> {
            self.record(Call::Create {
                title: page.title.clone(),
                blocks: children.to_vec(),
            })?;
            Ok(PageRef {
                id: "page-1".into(),
                url: None,
            })
        }

        async fn append_children(&self, page_id: &str, children: &[Block]) -> Result<(), ApiError> {
            self.record(Call::Append {
                page_id: page_id.into(),
                blocks: children.to_vec(),
            })
        }

        async fn archive_page(&self, page_id: &str) -> Result<(), ApiError> {
            self.record(Call::Archive {
                page_id: page_id.into(),
            })
        }
    }

    fn numbered_blocks(n: usize) -> Vec<Block> {
        (0..n)
            .map(|i| Block::Paragraph {
                content: vec![Span::Plain(i.to_string())],
            })
            .collect()
    }

    fn page() -> PageSpec {
        PageSpec {
            parent_id: "parent".into(),
            title: "Doc".into(),
            icon: None,
        }
    }

    fn sent_blocks(calls: &[Call]) -> Vec<Block> {
        calls
            .iter()
            .flat_map(|call| match call {
                Call::Create { blocks, .. } | Call::Append { blocks, .. } => blocks.clone(),
                Call::Archive { .. } => Vec::new(),
            })
            .collect()
    }

    fn chunk_sizes(calls: &[Call]) -> Vec<usize> {
        calls
            .iter()
            .filter_map(|call| match call {
                Call::Create { blocks, .. } | Call::Append { blocks, .. } => Some(blocks.len()),
                Call::Archive { .. } => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn publishes_250_blocks_in_three_calls() {
        let blocks = numbered_blocks(250);
        let publisher = Publisher::new(RecordingApi::default());

        let published = publisher.publish(&page(), &blocks).await.unwrap();

        let calls = publisher.api().calls();
        assert!(matches!(calls[0], Call::Create { .. }));
        assert!(matches!(calls[1], Call::Append { .. }));
        assert!(matches!(calls[2], Call::Append { .. }));
        assert_eq!(chunk_sizes(&calls), vec![100, 100, 50]);
        assert_eq!(sent_blocks(&calls), blocks);
        assert_eq!(published.chunks_sent, 3);
        assert_eq!(published.blocks_sent, 250);
        assert_eq!(published.page_id, "page-1");
        assert_eq!(published.url, "https://notion.so/page1");
    }

    #[tokio::test]
    async fn empty_document_still_creates_page() {
        let publisher = Publisher::new(RecordingApi::default());
        let published = publisher.publish(&page(), &[]).await.unwrap();
        assert_eq!(chunk_sizes(&publisher.api().calls()), vec![0]);
        assert_eq!(published.chunks_sent, 1);
    }

    #[tokio::test]
    async fn exactly_one_full_chunk_needs_no_append() {
        let publisher = Publisher::new(RecordingApi::default());
        publisher.publish(&page(), &numbered_blocks(100)).await.unwrap();
        assert_eq!(chunk_sizes(&publisher.api().calls()), vec![100]);
    }

    #[tokio::test]
    async fn failed_append_reports_resume_chunk() {
        let blocks = numbered_blocks(250);
        let publisher = Publisher::new(RecordingApi::failing_at(2));

        let err = publisher.publish(&page(), &blocks).await.unwrap_err();

        assert_eq!(err.resume_from(), Some(2));
        assert_eq!(err.page_id(), Some("page-1"));
        assert!(err.to_string().contains("resume from chunk index 2"));
        let PublishError::Append {
            appended_blocks, ..
        } = err
        else {
            panic!("expected append error");
        };
        assert_eq!(appended_blocks, 200);
        assert_eq!(chunk_sizes(&publisher.api().calls()), vec![100, 100]);
    }

    #[tokio::test]
    async fn failed_create_aborts() {
        let publisher = Publisher::new(RecordingApi::failing_at(0));
        let err = publisher
            .publish(&page(), &numbered_blocks(150))
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Create { .. }));
        assert!(publisher.api().calls().is_empty());
    }

    #[tokio::test]
    async fn resume_sends_remaining_chunks() {
        let blocks = numbered_blocks(250);
        let publisher = Publisher::new(RecordingApi::default());

        let published = publisher.resume("page-9", &blocks, 2).await.unwrap();

        assert_eq!(
            publisher.api().calls(),
            vec![Call::Append {
                page_id: "page-9".into(),
                blocks: blocks[200..].to_vec(),
            }]
        );
        assert_eq!(published.chunks_sent, 1);
        assert_eq!(published.blocks_sent, 50);
    }

    #[tokio::test]
    async fn resume_failure_reports_absolute_chunk_index() {
        let publisher = Publisher::new(RecordingApi::failing_at(1)).with_chunk_size(10);
        let err = publisher
            .resume("page-9", &numbered_blocks(50), 2)
            .await
            .unwrap_err();
        assert_eq!(err.resume_from(), Some(3));
    }

    #[tokio::test]
    async fn resume_rejects_creation_and_missing_chunks() {
        let publisher = Publisher::new(RecordingApi::default());
        let blocks = numbered_blocks(150);
        for chunk_index in [0, 2, 7] {
            let err = publisher.resume("p", &blocks, chunk_index).await.unwrap_err();
            assert!(matches!(
                err,
                PublishError::ChunkOutOfRange { chunks: 2, .. }
            ));
        }
        assert!(publisher.api().calls().is_empty());
    }

    #[tokio::test]
    async fn replace_archives_first() {
        let publisher = Publisher::new(RecordingApi::default());
        publisher
            .replace("old-page", &page(), &numbered_blocks(3))
            .await
            .unwrap();
        let calls = publisher.api().calls();
        assert_eq!(
            calls[0],
            Call::Archive {
                page_id: "old-page".into()
            }
        );
        assert!(matches!(calls[1], Call::Create { .. }));
        assert_eq!(calls.len(), 2);
    }

    #[tokio::test]
    async fn failed_archive_creates_nothing() {
        let publisher = Publisher::new(RecordingApi::failing_at(0));
        let err = publisher
            .replace("old-page", &page(), &numbered_blocks(3))
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Archive { .. }));
        assert!(publisher.api().calls().is_empty());
    }

    #[tokio::test]
    async fn table_counts_as_one_block() {
        let blocks = crate::parse(&format!(
            "| h |\n|---|\n{}\n\nafter",
            "| r |\n".repeat(150)
        ));
        assert_eq!(blocks.len(), 2);
        let publisher = Publisher::new(RecordingApi::default());
        publisher.publish(&page(), &blocks).await.unwrap();
        assert_eq!(chunk_sizes(&publisher.api().calls()), vec![2]);
    }

    #[tokio::test]
    async fn smaller_chunk_size() {
        let publisher = Publisher::new(RecordingApi::default()).with_chunk_size(40);
        publisher.publish(&page(), &numbered_blocks(90)).await.unwrap();
        assert_eq!(chunk_sizes(&publisher.api().calls()), vec![40, 40, 10]);
    }

    proptest! {
        #[test]
        fn chunk_count_and_order(n in 0usize..700, size in 1usize..=100) {
            let blocks = numbered_blocks(n);
            let chunks = chunks(&blocks, size);
            prop_assert_eq!(chunks.len(), n.max(1).div_ceil(size));
            prop_assert!(chunks.iter().all(|c| c.len() <= size));
            let rejoined: Vec<Block> = chunks.concat();
            prop_assert_eq!(rejoined, blocks);
        }

        #[test]
        fn publish_call_count(n in 0usize..450) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let blocks = numbered_blocks(n);
            let publisher = Publisher::new(RecordingApi::default());
            let published = runtime.block_on(publisher.publish(&page(), &blocks)).unwrap();
            let calls = publisher.api().calls();
            prop_assert_eq!(calls.len(), n.max(1).div_ceil(100));
            prop_assert_eq!(published.chunks_sent, calls.len());
            prop_assert_eq!(sent_blocks(&calls), blocks);
        }
    }
}
