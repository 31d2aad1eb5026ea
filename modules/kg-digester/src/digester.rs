use std::sync::Arc;
use std::time::Duration;

use kg_common::StageSummary;
use kg_store::{FactStore, NewFact};
use pgvector::Vector;
use tracing::{info, warn};

use crate::embedder::{FactEmbedder, EMBEDDING_DIM};
use crate::extractor::FactExtractor;

const MIN_CONFIDENCE: f64 = 0.4;
const MAX_FACTS_PER_ARTICLE: usize = 20;
const MAX_FIELD_CHARS: usize = 200;

pub struct Digester {
    store: FactStore,
    extractor: Arc<dyn FactExtractor>,
    embedder: Arc<dyn FactEmbedder>,
    t_extract: Duration,
    t_embed: Duration,
    t_query: Duration,
    tau_dedupe: f64,
}

impl Digester {
    pub fn new(
        store: FactStore,
        extractor: Arc<dyn FactExtractor>,
        embedder: Arc<dyn FactEmbedder>,
        t_extract: Duration,
        t_embed: Duration,
        t_query: Duration,
        tau_dedupe: f64,
    ) -> Self {
        Self {
            store,
            extractor,
            embedder,
            t_extract,
            t_embed,
            t_query,
            tau_dedupe,
        }
    }

    /// Claim up to `batch_digest` rows and digest each independently. A
    /// failure on one article never aborts the batch — the Digester prefers
    /// to commit what it has and return cleanly.
    pub async fn digest_once(&self, batch_digest: i64) -> StageSummary {
        let candidates = match self.store.claim_digest_batch(batch_digest).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "failed to claim digest batch");
                return StageSummary::default();
            }
        };

        let mut summary = StageSummary::default();
        for candidate in candidates {
            match self.digest_one(candidate.id, &candidate.raw_text).await {
                Ok(fact_count) => {
                    info!(article_id = candidate.id, fact_count, "article digested");
                    summary.processed += 1;
                }
                Err(e) => {
                    warn!(article_id = candidate.id, error = %e, "digest failed for article");
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// FETCHED -> EXTRACTED -> EMBEDDED(i) -> PERSISTED(i) -> STAMPED.
    pub async fn digest_one(&self, article_id: i64, raw_text: &str) -> anyhow::Result<usize> {
        // FETCHED: raw_text was already hydrated; an empty body still stamps.
        if raw_text.trim().is_empty() {
            self.store.stamp_article_with_facts(article_id, Vec::new()).await?;
            return Ok(0);
        }

        // EXTRACTED, with one retry on failure/timeout before stamping empty.
        let candidates = match self.extract_with_retry(raw_text).await {
            Some(c) => c,
            None => {
                self.store.stamp_article_with_facts(article_id, Vec::new()).await?;
                return Ok(0);
            }
        };

        let mut accepted = Vec::new();
        for candidate in candidates.into_iter().take(MAX_FACTS_PER_ARTICLE) {
            let subject = kg_common::clamp_text(candidate.subject.trim(), MAX_FIELD_CHARS);
            let predicate = kg_common::clamp_text(candidate.predicate.trim(), MAX_FIELD_CHARS);
            let object = kg_common::clamp_text(candidate.object.trim(), MAX_FIELD_CHARS);
            let confidence = kg_common::clamp_confidence(candidate.confidence);

            if subject.is_empty() || predicate.is_empty() || object.is_empty() || confidence < MIN_CONFIDENCE {
                continue;
            }

            // EMBEDED(i): embed failure on one candidate skips that candidate only.
            let statement = format!("{subject} {predicate} {object}");
            let embedding = match tokio::time::timeout(self.t_embed, self.embedder.embed(&statement)).await {
                Ok(Ok(vec)) if vec.len() == EMBEDDING_DIM => vec,
                Ok(Ok(vec)) => {
                    warn!(article_id, got = vec.len(), want = EMBEDDING_DIM, "embedding dimension mismatch, dropping candidate");
                    continue;
                }
                Ok(Err(e)) => {
                    warn!(article_id, error = %e, "embed call failed, dropping candidate");
                    continue;
                }
                Err(_) => {
                    warn!(article_id, "embed call timed out, dropping candidate");
                    continue;
                }
            };

            // Dedupe gate: nearest existing fact by cosine distance, global scope.
            let vector = Vector::from(embedding);
            let nearest = tokio::time::timeout(self.t_query, self.store.find_nearest_fact(&vector)).await;
            let is_duplicate = match nearest {
                Ok(Ok(Some((_, distance)))) => distance < self.tau_dedupe,
                Ok(Ok(None)) => false,
                Ok(Err(e)) => {
                    warn!(article_id, error = %e, "dedupe query failed, proceeding with insert");
                    false
                }
                Err(_) => {
                    warn!(article_id, "dedupe query timed out, proceeding with insert");
                    false
                }
            };

            if is_duplicate {
                continue;
            }

            accepted.push(NewFact {
                subject,
                predicate,
                object,
                confidence,
                embedding: vector,
            });
        }

        // PERSISTED(i) -> STAMPED: one transaction commits every surviving fact
        // together with the article's processed_at stamp.
        let inserted = self.store.stamp_article_with_facts(article_id, accepted).await?;
        Ok(inserted)
    }

    async fn extract_with_retry(&self, text: &str) -> Option<Vec<crate::extractor::ExtractedFact>> {
        for attempt in 0..2 {
            match tokio::time::timeout(self.t_extract, self.extractor.extract(text)).await {
                Ok(Ok(facts)) => return Some(facts),
                Ok(Err(e)) if attempt == 0 => {
                    warn!(error = %e, "extraction failed, retrying once");
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "extraction failed on retry, stamping with zero facts");
                    return None;
                }
                Err(_) if attempt == 0 => {
                    warn!("extraction timed out, retrying once");
                }
                Err(_) => {
                    warn!("extraction timed out on retry, stamping with zero facts");
                    return None;
                }
            }
        }
        None
    }
}
