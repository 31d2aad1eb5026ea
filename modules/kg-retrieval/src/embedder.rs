use ai_client::openai::OpenAi;
use ai_client::traits::EmbedAgent;
use anyhow::Result;
use async_trait::async_trait;

/// Query-side counterpart to the Digester's fact embedder. Kept as its own
/// small wrapper rather than shared with `kg-digester` because the two call
/// sites have independent deadlines and independently configured clients.
#[async_trait]
pub trait QueryEmbedder: Send + Sync {
    async fn embed(&self, query: &str) -> Result<Vec<f32>>;
}

pub struct VoyageQueryEmbedder {
    client: OpenAi,
}

impl VoyageQueryEmbedder {
    pub fn new(voyage_api_key: &str) -> Self {
        let client = OpenAi::new(voyage_api_key, "voyage-3-lite")
            .with_base_url("https://api.voyageai.com/v1")
            .with_embedding_model("voyage-3-lite");
        Self { client }
    }
}

#[async_trait]
impl QueryEmbedder for VoyageQueryEmbedder {
    async fn embed(&self, query: &str) -> Result<Vec<f32>> {
        self.client.embed(query.to_string()).await
    }
}
