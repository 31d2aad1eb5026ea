use std::collections::HashSet;

use kg_common::StageSummary;
use kg_graph::{ArticleNode, FactNode, GraphWriter};
use kg_store::FactStore;
use tracing::warn;

pub struct Publisher {
    store: FactStore,
    writer: GraphWriter,
}

impl Publisher {
    pub fn new(store: FactStore, writer: GraphWriter) -> Self {
        Self { store, writer }
    }

    /// Select the quality-gated facts and articles, derive assertions, and
    /// project into the Graph Store. Ordering (articles, facts, edges) is
    /// enforced by `GraphWriter::project`; partial failure here is
    /// acceptable — the next run completes the remainder.
    pub async fn sync_once(&self) -> StageSummary {
        let facts = match self.store.select_publishable_facts().await {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "failed to select publishable facts");
                return StageSummary::default();
            }
        };
        let articles = match self.store.select_publishable_articles().await {
            Ok(a) => a,
            Err(e) => {
                warn!(error = %e, "failed to select publishable articles");
                return StageSummary::default();
            }
        };

        let article_ids: HashSet<i64> = articles.iter().map(|a| a.id).collect();

        let article_nodes: Vec<ArticleNode> = articles
            .iter()
            .map(|a| ArticleNode {
                id: a.id,
                title: a.title.clone(),
                url: a.url.clone(),
                published_date: a.published_date,
                is_reference: a.is_reference,
            })
            .collect();

        let fact_nodes: Vec<FactNode> = facts
            .iter()
            .map(|f| FactNode {
                id: f.id,
                subject: f.subject.clone(),
                predicate: f.predicate.clone(),
                object: f.object.clone(),
                confidence: f.confidence,
                embedding: f.embedding.as_slice().iter().map(|x| *x as f64).collect(),
            })
            .collect();

        let assertions: Vec<(i64, i64)> = facts
            .iter()
            .filter(|f| article_ids.contains(&f.article_id))
            .map(|f| (f.article_id, f.id))
            .collect();
        let assertion_count = assertions.len();

        let mut summary = StageSummary::default();
        match self.writer.project(&article_nodes, &fact_nodes, &assertions).await {
            Ok(()) => {
                summary.processed = (article_nodes.len() + fact_nodes.len() + assertion_count) as u32;
            }
            Err(e) => {
                warn!(error = %e, "graph projection failed, will retry next pass");
                summary.failed = 1;
            }
        }
        summary
    }
}
