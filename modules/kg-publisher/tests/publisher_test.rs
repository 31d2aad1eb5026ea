use kg_graph::GraphWriter;
use kg_publisher::Publisher;
use kg_store::{IngestionSource, NewArticle, NewFact};
use pgvector::Vector;

fn unit_vector(lead: f32) -> Vector {
    let mut v = vec![0.0f32; 384];
    v[0] = lead;
    Vector::from(v)
}

async fn fact_node_count(client: &kg_graph::GraphClient) -> i64 {
    let mut result = client
        .inner()
        .execute(neo4rs::query("MATCH (f:Fact) RETURN count(f) AS c"))
        .await
        .unwrap();
    let row = result.next().await.unwrap().unwrap();
    row.get("c").unwrap()
}

#[tokio::test]
async fn publisher_quality_gate_projects_only_checked_originals() {
    let (_pg_container, store) = kg_store::testutil::postgres_container().await;
    let (_neo_container, graph_client) = kg_graph::testutil::neo4j_container().await;
    kg_graph::migrate(&graph_client).await.unwrap();

    let article_id = store
        .upsert_article(NewArticle {
            url: "https://example.com/a".to_string(),
            title: "A".to_string(),
            publisher: String::new(),
            source: IngestionSource::Rss,
            published_date: None,
        })
        .await
        .unwrap()
        .article_id;

    // 4 checked originals, 3 unchecked originals, 3 confirmed non-originals.
    let mut facts = Vec::new();
    for i in 0..10 {
        facts.push(NewFact {
            subject: format!("subject-{i}"),
            predicate: "predicate".to_string(),
            object: "object".to_string(),
            confidence: 0.9,
            embedding: unit_vector(i as f32 / 10.0),
        });
    }
    store.stamp_article_with_facts(article_id, facts).await.unwrap();

    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM extracted_facts ORDER BY id")
        .fetch_all(store.pool())
        .await
        .unwrap();

    for &id in &ids[0..4] {
        store.stamp_provenance(id, true, None).await.unwrap();
    }
    for &id in &ids[7..10] {
        store.stamp_provenance(id, false, Some(ids[0])).await.unwrap();
    }
    // ids[4..7] stay unchecked (checked_at IS NULL).

    let writer = GraphWriter::new(graph_client.clone());
    let publisher = Publisher::new(store, writer);
    publisher.sync_once().await;

    assert_eq!(fact_node_count(&graph_client).await, 4);
}
