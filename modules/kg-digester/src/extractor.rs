use ai_client::claude::Claude;
use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One candidate `(subject, predicate, object, confidence)` triple as
/// reported by the Extractor, before any clamping or the dedupe gate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedFact {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    /// Self-reported confidence in [0, 1]; callers must re-clamp, never trust.
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionResponse {
    #[serde(default)]
    pub facts: Vec<ExtractedFact>,
}

#[async_trait]
pub trait FactExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Vec<ExtractedFact>>;
}

const SYSTEM_PROMPT: &str = r#"You extract factual subject-predicate-object triples from article text.

Each fact should be a short, self-contained claim: a subject, a predicate (relationship or
action), and an object. Keep each field under 200 characters.

Report a confidence in [0, 1] reflecting how explicitly the text states the fact versus how
much you had to infer. Omit facts you are not reasonably confident about.

If the text contains no clear factual claims, return an empty facts array."#;

/// Claude-backed Extractor. Mirrors the civic-signal extractor's shape but
/// emits plain SPO triples instead of typed community signals.
pub struct ClaudeFactExtractor {
    claude: Claude,
}

impl ClaudeFactExtractor {
    pub fn new(anthropic_api_key: &str) -> Self {
        Self {
            claude: Claude::new(anthropic_api_key, "claude-haiku-4-5-20251001"),
        }
    }
}

#[async_trait]
impl FactExtractor for ClaudeFactExtractor {
    async fn extract(&self, text: &str) -> Result<Vec<ExtractedFact>> {
        let text = kg_common::clamp_text(text, 30_000);
        let user_prompt = format!("Extract factual triples from this article text.\n\n---\n\n{text}");

        let response: ExtractionResponse = self.claude.extract(SYSTEM_PROMPT, &user_prompt).await?;
        Ok(response.facts)
    }
}
