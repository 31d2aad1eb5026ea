use neo4rs::query;
use serde_json::json;

use crate::GraphClient;

/// Read-side helpers that don't belong to the hybrid query builder (that
/// lives in the retrieval engine, which talks to `GraphClient` directly so
/// it can compose the scoring formula's Cypher itself).
#[derive(Clone)]
pub struct GraphReader {
    client: GraphClient,
}

impl GraphReader {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Elements for the UI's fact-graph view: the fact node plus every
    /// article that asserts it.
    pub async fn fact_graph(&self, fact_id: i64) -> Result<serde_json::Value, neo4rs::Error> {
        let q = query(
            "MATCH (f:Fact {id: $id})
             OPTIONAL MATCH (a:Article)-[:ASSERTED]->(f)
             RETURN f.id AS fact_id, f.subject AS subject, f.predicate AS predicate,
                    f.object AS object, f.confidence AS confidence,
                    collect({id: a.id, title: a.title, url: a.url}) AS articles",
        )
        .param("id", fact_id);

        let mut stream = self.client.graph.execute(q).await?;
        let mut elements = Vec::new();

        if let Some(row) = stream.next().await? {
            let subject: String = row.get("subject").unwrap_or_default();
            let predicate: String = row.get("predicate").unwrap_or_default();
            let object: String = row.get("object").unwrap_or_default();
            let confidence: f64 = row.get("confidence").unwrap_or(0.0);

            elements.push(json!({
                "type": "node",
                "label": "Fact",
                "data": { "id": fact_id, "subject": subject, "predicate": predicate, "object": object, "confidence": confidence },
            }));

            if let Ok(articles) = row.get::<Vec<neo4rs::BoltMap>>("articles") {
                for article in articles {
                    let id: Option<i64> = article.get("id").ok();
                    if let Some(id) = id {
                        let title: String = article.get("title").unwrap_or_default();
                        let url: String = article.get("url").unwrap_or_default();
                        elements.push(json!({
                            "type": "node",
                            "label": "Article",
                            "data": { "id": id, "title": title, "url": url },
                        }));
                        elements.push(json!({
                            "type": "edge",
                            "label": "ASSERTED",
                            "data": { "source": id, "target": fact_id },
                        }));
                    }
                }
            }
        }

        Ok(json!({ "elements": elements }))
    }
}
