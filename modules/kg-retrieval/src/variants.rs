use ai_client::claude::Claude;
use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct VariantResponse {
    #[serde(default)]
    variants: Vec<String>,
}

/// Produces alternative phrasings of a user query so keyword matching isn't
/// tied to the exact words the user typed.
#[async_trait]
pub trait QueryExpander: Send + Sync {
    async fn expand(&self, query: &str, n: usize) -> Result<Vec<String>>;
}

pub struct ClaudeQueryExpander {
    claude: Claude,
}

impl ClaudeQueryExpander {
    pub fn new(anthropic_api_key: &str) -> Self {
        Self {
            claude: Claude::new(anthropic_api_key, "claude-haiku-4-5-20251001"),
        }
    }
}

#[async_trait]
impl QueryExpander for ClaudeQueryExpander {
    async fn expand(&self, query: &str, n: usize) -> Result<Vec<String>> {
        let system = "You rephrase a search query into alternative short phrasings \
            that preserve its meaning, for keyword matching against short factual \
            statements. Return only the phrasings, no explanation.";
        let user = format!("Give {n} alternative phrasings of: {query}");

        let response: VariantResponse = self.claude.extract(system, &user).await?;
        Ok(response.variants.into_iter().take(n).collect())
    }
}
