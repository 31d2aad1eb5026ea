//! Integration tests against a real Postgres+pgvector instance.
//!
//! Requirements: Docker (for Postgres via testcontainers)
//!
//! Run with: cargo test -p kg-store --features test-utils --test store_test

#![cfg(feature = "test-utils")]

use kg_store::{IngestionSource, NewArticle, NewFact, Vector};

async fn setup() -> (impl std::any::Any, kg_store::FactStore) {
    kg_store::testutil::postgres_container().await
}

fn unit_vector(lead: f32) -> Vector {
    let mut v = vec![0.0f32; 384];
    v[0] = lead;
    Vector::from(v)
}

#[tokio::test]
async fn ingest_is_idempotent_on_url() {
    let (_container, store) = setup().await;

    let first = store
        .upsert_article(NewArticle {
            url: "https://example.com/a".to_string(),
            title: "A".to_string(),
            publisher: "Example".to_string(),
            source: IngestionSource::Rss,
            published_date: None,
        })
        .await
        .unwrap();
    assert!(first.inserted);

    let second = store
        .upsert_article(NewArticle {
            url: "https://example.com/a".to_string(),
            title: "A (updated title, ignored)".to_string(),
            publisher: "Example".to_string(),
            source: IngestionSource::Rss,
            published_date: None,
        })
        .await
        .unwrap();
    assert!(!second.inserted);
    assert_eq!(first.article_id, second.article_id);
}

#[tokio::test]
async fn dedupe_gate_rejects_near_duplicate_embeddings() {
    let (_container, store) = setup().await;

    let outcome = store
        .upsert_article(NewArticle {
            url: "https://example.com/paris".to_string(),
            title: "Paris".to_string(),
            publisher: "Example".to_string(),
            source: IngestionSource::Rss,
            published_date: None,
        })
        .await
        .unwrap();

    let embedding = unit_vector(1.0);
    store
        .stamp_article_with_facts(
            outcome.article_id,
            vec![NewFact {
                subject: "Paris".to_string(),
                predicate: "is the capital of".to_string(),
                object: "France".to_string(),
                confidence: 0.9,
                embedding: embedding.clone(),
            }],
        )
        .await
        .unwrap();

    let nearest = store.find_nearest_fact(&embedding).await.unwrap();
    assert!(nearest.is_some());
    let (_, distance) = nearest.unwrap();
    assert!(distance < 0.05, "identical embedding should be well within TAU_DEDUPE");
}

#[tokio::test]
async fn publisher_quality_gate_selects_only_checked_originals() {
    let (_container, store) = setup().await;

    let outcome = store
        .upsert_article(NewArticle {
            url: "https://example.com/gate".to_string(),
            title: "Gate".to_string(),
            publisher: "Example".to_string(),
            source: IngestionSource::Rss,
            published_date: None,
        })
        .await
        .unwrap();

    store
        .stamp_article_with_facts(
            outcome.article_id,
            vec![
                NewFact {
                    subject: "A".to_string(),
                    predicate: "is".to_string(),
                    object: "checked-original".to_string(),
                    confidence: 0.9,
                    embedding: unit_vector(1.0),
                },
                NewFact {
                    subject: "B".to_string(),
                    predicate: "is".to_string(),
                    object: "unchecked".to_string(),
                    confidence: 0.9,
                    embedding: unit_vector(2.0),
                },
            ],
        )
        .await
        .unwrap();

    let facts = store.select_publishable_facts().await.unwrap();
    assert!(facts.is_empty(), "nothing checked yet, gate must be empty");

    let unchecked = store.claim_provenance_batch(10).await.unwrap();
    let checked_one = unchecked
        .iter()
        .find(|f| f.object == "checked-original")
        .unwrap();
    store
        .stamp_provenance(checked_one.id, true, None)
        .await
        .unwrap();

    let facts = store.select_publishable_facts().await.unwrap();
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].object, "checked-original");
}
