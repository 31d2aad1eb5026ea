use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use kg_provenance::ProvenanceHunter;
use kg_search_client::{SearchClient, SearchResult};
use kg_store::{IngestionSource, NewArticle, NewFact};
use pgvector::Vector;

struct EmptySearch;

#[async_trait]
impl SearchClient for EmptySearch {
    async fn search(&self, _query: &str) -> kg_search_client::Result<Vec<SearchResult>> {
        Ok(Vec::new())
    }
}

fn unit_vector(lead: f32) -> Vector {
    let mut v = vec![0.0f32; 384];
    v[0] = lead;
    v[1] = (1.0f32 - lead * lead).max(0.0).sqrt();
    Vector::from(v)
}

async fn seed_article(store: &kg_store::FactStore, url: &str, published: chrono::DateTime<Utc>) -> i64 {
    store
        .upsert_article(NewArticle {
            url: url.to_string(),
            title: String::new(),
            publisher: String::new(),
            source: IngestionSource::Rss,
            published_date: Some(published),
        })
        .await
        .unwrap()
        .article_id
}

#[tokio::test]
async fn provenance_downgrade_points_at_the_older_fact() {
    let (_container, store) = kg_store::testutil::postgres_container().await;

    let older_date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let newer_date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let article_old = seed_article(&store, "https://example.com/old", older_date).await;
    let article_new = seed_article(&store, "https://example.com/new", newer_date).await;

    let embedding = unit_vector(1.0);

    store
        .stamp_article_with_facts(
            article_old,
            vec![NewFact {
                subject: "the mayor".to_string(),
                predicate: "announced".to_string(),
                object: "a new park".to_string(),
                confidence: 0.9,
                embedding: embedding.clone(),
            }],
        )
        .await
        .unwrap();

    store
        .stamp_article_with_facts(
            article_new,
            vec![NewFact {
                subject: "the mayor".to_string(),
                predicate: "announced".to_string(),
                object: "a new park".to_string(),
                confidence: 0.9,
                embedding: embedding.clone(),
            }],
        )
        .await
        .unwrap();

    let hunter = ProvenanceHunter::new(store.clone(), Arc::new(EmptySearch), 0.15);
    let summary = hunter.hunt_once(10).await;
    assert_eq!(summary.processed, 2);

    let facts: Vec<(i64, Option<bool>)> = sqlx::query_as("SELECT id, is_original FROM extracted_facts ORDER BY id")
        .fetch_all(store.pool())
        .await
        .unwrap();

    assert_eq!(facts[0].1, Some(true), "the older fact is original");
    assert_eq!(facts[1].1, Some(false), "the newer fact is downgraded");
}
