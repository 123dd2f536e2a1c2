use thiserror::Error;

/// Failures while fetching or extracting a single page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("no main content container on {url}")]
    MissingContent { url: String },

    #[error("parse error: {0}")]
    Parse(String),
}

/// Failures in the retrieval and generation half of the pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("embedding request failed: {0}")]
    Embedding(String),

    #[error("chat completion failed: {0}")]
    Chat(String),

    #[error("vector store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("stored embedding is not valid JSON: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("vector index is empty, run `docs_rag index` first")]
    EmptyIndex,
}

impl From<url::ParseError> for ScrapeError {
    fn from(e: url::ParseError) -> Self {
        ScrapeError::Parse(format!("invalid url: {}", e))
    }
}
