use neo4rs::query;
use tracing::info;

use crate::GraphClient;

/// Run idempotent schema migrations: uniqueness constraints and a vector
/// index. Safe to call on every startup — every statement is `IF NOT EXISTS`.
pub async fn migrate(client: &GraphClient) -> Result<(), neo4rs::Error> {
    let g = &client.graph;

    info!("running graph schema migrations");

    let constraints = [
        "CREATE CONSTRAINT article_id IF NOT EXISTS FOR (n:Article) REQUIRE n.id IS UNIQUE",
        "CREATE CONSTRAINT fact_id IF NOT EXISTS FOR (n:Fact) REQUIRE n.id IS UNIQUE",
    ];
    for c in &constraints {
        g.run(query(c)).await?;
    }
    info!("uniqueness constraints created");

    // 384-dim to match the Embedder contract (spec.md's teacher used 1024 for
    // Voyage embeddings; this pipeline's Embedder Client contract is 384).
    let vector = [
        "CREATE VECTOR INDEX fact_embedding IF NOT EXISTS FOR (n:Fact) ON (n.embedding) \
         OPTIONS {indexConfig: {`vector.dimensions`: 384, `vector.similarity_function`: 'cosine'}}",
    ];
    for v in &vector {
        g.run(query(v)).await?;
    }
    info!("vector index created");

    info!("graph schema migration complete");
    Ok(())
}
