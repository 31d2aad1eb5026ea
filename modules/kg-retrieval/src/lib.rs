pub mod embedder;
pub mod engine;
pub mod query;
pub mod variants;

pub use embedder::{QueryEmbedder, VoyageQueryEmbedder};
pub use engine::{AnswerError, RetrievalEngine};
pub use variants::{ClaudeQueryExpander, QueryExpander};
