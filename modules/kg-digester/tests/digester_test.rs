use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kg_digester::{Digester, ExtractedFact, FactEmbedder, FactExtractor};
use kg_store::{IngestionSource, NewArticle};

struct FixedExtractor(Vec<ExtractedFact>);

#[async_trait]
impl FactExtractor for FixedExtractor {
    async fn extract(&self, _text: &str) -> anyhow::Result<Vec<ExtractedFact>> {
        Ok(self.0.clone())
    }
}

/// Deterministic embedder: same text always yields the same unit vector, so
/// two paraphrases of the same fact land at cosine distance 0 in the test.
struct FixedEmbedder(Vec<f32>);

#[async_trait]
impl FactEmbedder for FixedEmbedder {
    async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(self.0.clone())
    }
}

struct SlowEmbedder;

#[async_trait]
impl FactEmbedder for SlowEmbedder {
    async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(vec![0.0; 384])
    }
}

fn unit_vector() -> Vec<f32> {
    let mut v = vec![0.0f32; 384];
    v[0] = 1.0;
    v
}

async fn seed_article(store: &kg_store::FactStore, url: &str) -> i64 {
    store
        .upsert_article(NewArticle {
            url: url.to_string(),
            title: String::new(),
            publisher: String::new(),
            source: IngestionSource::Rss,
            published_date: None,
        })
        .await
        .unwrap()
        .article_id
}

async fn fact_count(store: &kg_store::FactStore) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM extracted_facts")
        .fetch_one(store.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn digest_deduplication_rejects_near_duplicate_facts() {
    let (_container, store) = kg_store::testutil::postgres_container().await;

    let extracted = ExtractedFact {
        subject: "Paris".to_string(),
        predicate: "is the capital of".to_string(),
        object: "France".to_string(),
        confidence: 0.9,
    };
    let extractor: Arc<dyn FactExtractor> = Arc::new(FixedExtractor(vec![extracted]));
    let embedder: Arc<dyn FactEmbedder> = Arc::new(FixedEmbedder(unit_vector()));

    let digester = Digester::new(
        store.clone(),
        extractor,
        embedder,
        Duration::from_secs(5),
        Duration::from_secs(5),
        Duration::from_secs(5),
        0.05,
    );

    let article_a = seed_article(&store, "https://example.com/a").await;
    digester
        .digest_one(article_a, "Paris is the capital of France.")
        .await
        .unwrap();

    let article_b = seed_article(&store, "https://example.com/b").await;
    digester
        .digest_one(article_b, "The capital of France is Paris.")
        .await
        .unwrap();

    assert_eq!(
        fact_count(&store).await,
        1,
        "second paraphrase should be rejected by the dedupe gate"
    );
}

#[tokio::test]
async fn timeout_safety_yields_zero_facts_without_blocking() {
    let (_container, store) = kg_store::testutil::postgres_container().await;

    let extracted = ExtractedFact {
        subject: "Paris".to_string(),
        predicate: "is the capital of".to_string(),
        object: "France".to_string(),
        confidence: 0.9,
    };
    let extractor: Arc<dyn FactExtractor> = Arc::new(FixedExtractor(vec![extracted]));
    let embedder: Arc<dyn FactEmbedder> = Arc::new(SlowEmbedder);

    let digester = Digester::new(
        store.clone(),
        extractor,
        embedder,
        Duration::from_secs(5),
        Duration::from_secs(1),
        Duration::from_secs(5),
        0.05,
    );

    let article = seed_article(&store, "https://example.com/slow").await;
    let fact_count = digester
        .digest_one(article, "Paris is the capital of France.")
        .await
        .unwrap();
    assert_eq!(fact_count, 0);

    let row = store.article_by_id(article).await.unwrap().unwrap();
    assert!(row.processed_at.is_some());
}
