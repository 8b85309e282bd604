mod api;
mod block;
mod config;
mod error;
mod frontmatter;
mod inline;
mod notion;
mod parser;
mod publish;
mod table;
pub mod wire;

pub use api::{ContentApi, PageRef, PageSpec};
pub use block::{Block, HeadingLevel, Span, Table, TableRow};
pub use config::{Config, MAX_CHUNK_SIZE, NotionConfig, ParseConfig, PublishConfig};
pub use error::{ApiError, ConfigError, PublishError};
pub use frontmatter::PageMeta;
pub use inline::parse_spans;
pub use notion::NotionClient;
pub use parser::{Step, parse_next, parse_step};
pub use publish::{PublishedPage, Publisher, chunks};

/// A markdown document converted to blocks, with any frontmatter metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub meta: PageMeta,
    pub blocks: Vec<Block>,
}

impl Document {
    /// Title from frontmatter, else the first level-1 heading.
    pub fn title(&self) -> Option<String> {
        self.meta
            .title
            .clone()
            .or_else(|| frontmatter::first_title(&self.blocks))
    }
}

/// Parse markdown text into a vector of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Parse a markdown document, splitting off frontmatter when configured.
pub fn parse_document(markdown: &str, config: &ParseConfig) -> Document {
    let (meta, body) = if config.strip_frontmatter {
        frontmatter::strip(markdown)
    } else {
        (None, markdown)
    };

    Document {
        meta: meta.unwrap_or_default(),
        blocks: parser::parse(body),
    }
}

/// Wire JSON for the calls a publish would make, one array per chunk.
pub fn chunks_to_json(
    blocks: &[Block],
    chunk_size: usize,
) -> Result<serde_json::Value, serde_json::Error> {
    let chunks: Vec<_> = chunks(blocks, chunk_size)
        .into_iter()
        .map(wire::wire_blocks)
        .collect();
    serde_json::to_value(chunks)
}
