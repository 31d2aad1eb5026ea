use neo4rs::query;
use tracing::info;

use crate::model::{ArticleNode, FactNode};
use crate::GraphClient;

/// Idempotent projection into the graph. Every write is a `MERGE` keyed on
/// the stable relational id, so replaying the same payload never duplicates
/// nodes or edges.
#[derive(Clone)]
pub struct GraphWriter {
    client: GraphClient,
}

impl GraphWriter {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GraphClient {
        &self.client
    }

    pub async fn upsert_article(&self, article: &ArticleNode) -> Result<(), neo4rs::Error> {
        let q = query(
            "MERGE (a:Article {id: $id})
             SET a.title = $title,
                 a.url = $url,
                 a.published_date = $published_date,
                 a.is_reference = $is_reference",
        )
        .param("id", article.id)
        .param("title", article.title.as_str())
        .param("url", article.url.as_str())
        .param(
            "published_date",
            article.published_date.map(|d| d.to_rfc3339()),
        )
        .param("is_reference", article.is_reference);

        self.client.graph.run(q).await?;
        Ok(())
    }

    pub async fn upsert_fact(&self, fact: &FactNode) -> Result<(), neo4rs::Error> {
        let q = query(
            "MERGE (f:Fact {id: $id})
             SET f.text = $text,
                 f.subject = $subject,
                 f.predicate = $predicate,
                 f.object = $object,
                 f.confidence = $confidence,
                 f.embedding = $embedding",
        )
        .param("id", fact.id)
        .param("text", fact.text())
        .param("subject", fact.subject.as_str())
        .param("predicate", fact.predicate.as_str())
        .param("object", fact.object.as_str())
        .param("confidence", fact.confidence)
        .param("embedding", fact.embedding.clone());

        self.client.graph.run(q).await?;
        Ok(())
    }

    pub async fn assert_edge(&self, article_id: i64, fact_id: i64) -> Result<(), neo4rs::Error> {
        let q = query(
            "MATCH (a:Article {id: $article_id})
             MATCH (f:Fact {id: $fact_id})
             MERGE (a)-[:ASSERTED]->(f)",
        )
        .param("article_id", article_id)
        .param("fact_id", fact_id);

        self.client.graph.run(q).await?;
        Ok(())
    }

    /// Project a full payload, preserving the required ordering: articles
    /// before facts before edges. Partial failure is acceptable — the next
    /// `sync_once()` completes the remainder.
    pub async fn project(
        &self,
        articles: &[ArticleNode],
        facts: &[FactNode],
        assertions: &[(i64, i64)],
    ) -> Result<(), neo4rs::Error> {
        for article in articles {
            self.upsert_article(article).await?;
        }
        for fact in facts {
            self.upsert_fact(fact).await?;
        }
        for (article_id, fact_id) in assertions {
            self.assert_edge(*article_id, *fact_id).await?;
        }
        info!(
            articles = articles.len(),
            facts = facts.len(),
            assertions = assertions.len(),
            "graph projection complete"
        );
        Ok(())
    }
}
