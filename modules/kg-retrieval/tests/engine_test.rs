use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use kg_graph::{FactNode, GraphWriter};
use kg_retrieval::{QueryEmbedder, QueryExpander, RetrievalEngine};

struct NoExpansion;

#[async_trait]
impl QueryExpander for NoExpansion {
    async fn expand(&self, _query: &str, _n: usize) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

struct FixedEmbedder(Vec<f32>);

#[async_trait]
impl QueryEmbedder for FixedEmbedder {
    async fn embed(&self, _query: &str) -> Result<Vec<f32>> {
        Ok(self.0.clone())
    }
}

fn unit_vector(lead: f64) -> Vec<f64> {
    let mut v = vec![0.0f64; 384];
    v[0] = lead;
    v
}

#[tokio::test]
async fn hybrid_ranking_orders_by_confidence_boost_when_cosine_ties() {
    let (_container, client) = kg_graph::testutil::neo4j_container().await;
    kg_graph::migrate(&client).await.unwrap();
    let writer = GraphWriter::new(client.clone());

    // Identical text and embedding direction across all three facts isolates
    // the confidence/boost terms of the scoring formula.
    let facts = [
        (1_i64, 0.95_f64),
        (2_i64, 0.85_f64),
        (3_i64, 0.50_f64),
    ];
    for (id, confidence) in facts {
        writer
            .upsert_fact(&FactNode {
                id,
                subject: "river".to_string(),
                predicate: "flows through".to_string(),
                object: "valley".to_string(),
                confidence,
                embedding: unit_vector(1.0),
            })
            .await
            .unwrap();
    }

    let mut query_embedding = vec![0.0f32; 384];
    query_embedding[0] = 1.0;

    let engine = RetrievalEngine::new(
        client,
        Arc::new(NoExpansion),
        Arc::new(FixedEmbedder(query_embedding)),
        3,
        15,
        0.5,
        0.5,
        Duration::from_secs(5),
    );

    let ranked = engine.answer("river valley").await.unwrap();

    let ids: Vec<i64> = ranked.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(ranked[0].relevance > ranked[1].relevance);
    assert!(ranked[1].relevance > ranked[2].relevance);
}

#[tokio::test]
async fn query_over_max_length_is_rejected_without_touching_the_graph() {
    let (_container, client) = kg_graph::testutil::neo4j_container().await;
    kg_graph::migrate(&client).await.unwrap();

    let engine = RetrievalEngine::new(
        client,
        Arc::new(NoExpansion),
        Arc::new(FixedEmbedder(vec![0.0; 384])),
        3,
        15,
        0.5,
        0.5,
        Duration::from_secs(5),
    );

    let too_long = "a".repeat(513);
    let result = engine.answer(&too_long).await;
    assert!(matches!(result, Err(kg_retrieval::AnswerError::QueryTooLong)));
}
