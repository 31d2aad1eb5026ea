use std::sync::Arc;
use std::time::Duration;

use kg_graph::{GraphClient, RankedFact};
use thiserror::Error;
use tracing::warn;

use crate::embedder::QueryEmbedder;
use crate::query::rank_facts;
use crate::variants::QueryExpander;

const MAX_QUERY_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("query exceeds maximum length")]
    QueryTooLong,
    #[error("graph store unavailable")]
    GraphUnavailable,
}

pub struct RetrievalEngine {
    client: GraphClient,
    expander: Arc<dyn QueryExpander>,
    embedder: Arc<dyn QueryEmbedder>,
    n_expand: usize,
    n_results: usize,
    w_keyword: f64,
    w_vector: f64,
    t_query: Duration,
}

impl RetrievalEngine {
    pub fn new(
        client: GraphClient,
        expander: Arc<dyn QueryExpander>,
        embedder: Arc<dyn QueryEmbedder>,
        n_expand: usize,
        n_results: usize,
        w_keyword: f64,
        w_vector: f64,
        t_query: Duration,
    ) -> Self {
        Self {
            client,
            expander,
            embedder,
            n_expand,
            n_results,
            w_keyword,
            w_vector,
            t_query,
        }
    }

    /// Expands the query and embeds it concurrently (join-all-settled: a
    /// failure on either side degrades the strategy rather than failing the
    /// whole request), then executes the hybrid Cypher query.
    pub async fn answer(&self, query: &str) -> Result<Vec<RankedFact>, AnswerError> {
        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(AnswerError::QueryTooLong);
        }

        let (variants_result, embedding_result) =
            tokio::join!(self.expander.expand(query, self.n_expand), self.embedder.embed(query));

        let mut variants = match variants_result {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "query expansion failed, falling back to the raw query");
                Vec::new()
            }
        };
        variants.push(query.to_string());

        let embedding = match embedding_result {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, "query embedding failed, degrading to keyword-only scoring");
                None
            }
        };

        let result = tokio::time::timeout(
            self.t_query,
            rank_facts(&self.client, &variants, embedding, self.w_keyword, self.w_vector, self.n_results),
        )
        .await;

        match result {
            Ok(Ok(facts)) => Ok(facts),
            Ok(Err(e)) => {
                warn!(error = %e, "graph query failed");
                Err(AnswerError::GraphUnavailable)
            }
            Err(_) => {
                warn!("graph query timed out");
                Err(AnswerError::GraphUnavailable)
            }
        }
    }
}
