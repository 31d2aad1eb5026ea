pub mod digester;
pub mod embedder;
pub mod extractor;

pub use digester::Digester;
pub use embedder::{FactEmbedder, VoyageEmbedder};
pub use extractor::{ClaudeFactExtractor, ExtractedFact, FactExtractor};
