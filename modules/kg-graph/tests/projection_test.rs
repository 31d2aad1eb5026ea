//! Requirements: Docker (for Neo4j via testcontainers)
//!
//! Run with: cargo test -p kg-graph --features test-utils --test projection_test

#![cfg(feature = "test-utils")]

use kg_graph::{migrate, ArticleNode, FactNode, GraphWriter};

async fn setup() -> (impl std::any::Any, GraphWriter) {
    let (container, client) = kg_graph::testutil::neo4j_container().await;
    migrate(&client).await.unwrap();
    (container, GraphWriter::new(client))
}

fn fact(id: i64) -> FactNode {
    FactNode {
        id,
        subject: "Paris".to_string(),
        predicate: "is the capital of".to_string(),
        object: "France".to_string(),
        confidence: 0.9,
        embedding: vec![0.1; 384],
    }
}

fn article(id: i64) -> ArticleNode {
    ArticleNode {
        id,
        title: "Capitals of Europe".to_string(),
        url: format!("https://example.com/{id}"),
        published_date: None,
        is_reference: false,
    }
}

#[tokio::test]
async fn projection_is_idempotent() {
    let (_container, writer) = setup().await;

    let payload = (vec![article(1)], vec![fact(1)], vec![(1i64, 1i64)]);
    writer
        .project(&payload.0, &payload.1, &payload.2)
        .await
        .unwrap();
    writer
        .project(&payload.0, &payload.1, &payload.2)
        .await
        .unwrap();

    // Re-running with the same payload must not create duplicate nodes or
    // edges; upsert_fact/upsert_article use MERGE keyed on the relational id.
    let reader = kg_graph::GraphReader::new(writer.client().clone());
    let graph = reader.fact_graph(1).await.unwrap();
    let elements = graph["elements"].as_array().unwrap();
    let article_nodes = elements
        .iter()
        .filter(|e| e["label"] == "Article")
        .count();
    assert_eq!(article_nodes, 1);
}
