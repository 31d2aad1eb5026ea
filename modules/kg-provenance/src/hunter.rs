use std::sync::Arc;

use kg_common::StageSummary;
use kg_search_client::SearchClient;
use kg_store::FactStore;
use tracing::{info, warn};

pub struct ProvenanceHunter {
    store: FactStore,
    search: Arc<dyn SearchClient>,
    tau_prov: f64,
}

impl ProvenanceHunter {
    pub fn new(store: FactStore, search: Arc<dyn SearchClient>, tau_prov: f64) -> Self {
        Self { store, search, tau_prov }
    }

    /// Claim up to `batch_prov` unchecked facts and resolve originality for
    /// each. A Search Client failure leaves `checked_at` unset so the fact is
    /// retried on the next pass rather than being stamped on incomplete
    /// evidence.
    pub async fn hunt_once(&self, batch_prov: i64) -> StageSummary {
        let candidates = match self.store.claim_provenance_batch(batch_prov).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "failed to claim provenance batch");
                return StageSummary::default();
            }
        };

        let mut summary = StageSummary::default();
        for candidate in candidates {
            match self.hunt_one(&candidate).await {
                Ok(true) => summary.processed += 1,
                Ok(false) => summary.skipped += 1,
                Err(e) => {
                    warn!(fact_id = candidate.id, error = %e, "provenance check failed");
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// Returns `Ok(true)` if the fact was stamped, `Ok(false)` if the check
    /// was skipped (search failure, retried next pass).
    async fn hunt_one(&self, candidate: &kg_store::ProvenanceCandidate) -> anyhow::Result<bool> {
        // 1. Internal search: earliest existing fact within tau_prov that
        //    predates this one.
        let internal = self
            .store
            .find_older_internal_match(
                candidate.id,
                &candidate.embedding,
                candidate.article_published_date,
                self.tau_prov,
            )
            .await?;

        if let Some(older) = internal {
            info!(fact_id = candidate.id, provenance_id = older.fact_id, "internal provenance match");
            self.store.stamp_provenance(candidate.id, false, Some(older.fact_id)).await?;
            return Ok(true);
        }

        // 2. External search: only reached when no internal match exists.
        let statement = format!("{} {} {}", candidate.subject, candidate.predicate, candidate.object);
        let results = match self.search.search(&statement).await {
            Ok(results) => results,
            Err(e) => {
                warn!(fact_id = candidate.id, error = %e, "search client failed, skipping this fact");
                return Ok(false);
            }
        };

        let earlier_external = candidate.article_published_date.and_then(|article_date| {
            results
                .into_iter()
                .find(|r| r.published_date.is_some_and(|d| d <= article_date))
        });

        if let Some(result) = earlier_external {
            info!(fact_id = candidate.id, url = result.url, "external provenance match");
            self.store
                .upsert_reference_article(&result.url, result.published_date)
                .await?;
            self.store.stamp_provenance(candidate.id, false, None).await?;
            return Ok(true);
        }

        // 3. No older evidence anywhere: this fact is original.
        self.store.stamp_provenance(candidate.id, true, None).await?;
        Ok(true)
    }
}
