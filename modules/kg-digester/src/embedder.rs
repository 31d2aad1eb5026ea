use ai_client::openai::OpenAi;
use ai_client::traits::EmbedAgent;
use anyhow::Result;
use async_trait::async_trait;

/// The embedding column is fixed at 384 dimensions; any Embedder returning a
/// different length is a contract violation and its candidate is dropped by
/// the caller, never padded or truncated here.
pub const EMBEDDING_DIM: usize = 384;

#[async_trait]
pub trait FactEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Voyage AI embeddings via the OpenAI-compatible endpoint, same client shim
/// the civic-signal pipeline uses for its own embedder.
pub struct VoyageEmbedder {
    client: OpenAi,
}

impl VoyageEmbedder {
    pub fn new(voyage_api_key: &str) -> Self {
        let client = OpenAi::new(voyage_api_key, "voyage-3-lite")
            .with_base_url("https://api.voyageai.com/v1")
            .with_embedding_model("voyage-3-lite");
        Self { client }
    }
}

#[async_trait]
impl FactEmbedder for VoyageEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text.to_string()).await
    }
}
