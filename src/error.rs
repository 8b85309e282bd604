use std::path::PathBuf;

use thiserror::Error;

/// Longest response body quoted in an error message.
const BODY_EXCERPT_CHARS: usize = 300;

/// Failure of a single call to the content API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(status: u16, body: &str) -> Self {
        ApiError::Status {
            status,
            body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        }
    }
}

/// Failure of a publish, replace or resume run.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The create request was rejected or never answered.
    #[error("failed to create page: {source}")]
    Create {
        #[source]
        source: ApiError,
    },

    /// The create request succeeded but its response could not be read, so
    /// the page may exist without a known id. Retrying can duplicate it.
    #[error(
        "page may have been created but the response was unreadable: {source}; \
         check the parent page before retrying"
    )]
    CreateUnconfirmed {
        #[source]
        source: ApiError,
    },

    /// The page exists with the chunks before `chunk_index` attached.
    #[error(
        "failed to append chunk {chunk_index} to page {page_id} \
         ({appended_blocks} blocks already attached); resume from chunk index {chunk_index}"
    )]
    Append {
        page_id: String,
        chunk_index: usize,
        appended_blocks: usize,
        #[source]
        source: ApiError,
    },

    #[error("failed to archive page {page_id}: {source}")]
    Archive {
        page_id: String,
        #[source]
        source: ApiError,
    },

    #[error("chunk index {chunk_index} cannot be appended; document has {chunks} chunks")]
    ChunkOutOfRange { chunk_index: usize, chunks: usize },
}

impl PublishError {
    /// Classify a failed create call.
    pub fn create(source: ApiError) -> Self {
        match source {
            ApiError::Decode(_) => PublishError::CreateUnconfirmed { source },
            source => PublishError::Create { source },
        }
    }

    /// Chunk index a caller should pass to resume, if the page exists.
    pub fn resume_from(&self) -> Option<usize> {
        match self {
            PublishError::Append { chunk_index, .. } => Some(*chunk_index),
            _ => None,
        }
    }

    /// Id of the page left behind by a failed run.
    pub fn page_id(&self) -> Option<&str> {
        match self {
            PublishError::Append { page_id, .. } => Some(page_id),
            _ => None,
        }
    }
}

/// Configuration loading and resolution errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no parent page configured; set notion.parent_page_id or pass --parent")]
    MissingParent,

    #[error("no API token found in ${env_var} or the configured token file")]
    MissingToken { env_var: String },
}
