use thiserror::Error;

/// Error kinds shared by every pipeline stage. Each stage absorbs per-item
/// failures internally; these variants are surfaced only when a whole stage
/// invocation cannot proceed.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("database error: {0}")]
    Database(String),

    #[error("graph store error: {0}")]
    Graph(String),

    #[error("extraction error: {0}")]
    Extraction(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("search error: {0}")]
    Search(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(std::time::Duration),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("contract violation: {0}")]
    ContractViolation(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
