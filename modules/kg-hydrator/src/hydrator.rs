use std::time::Duration;

use browserless_client::BrowserlessClient;
use futures::stream::{self, StreamExt};
use kg_store::FactStore;
use tracing::{info, warn};

use crate::extract::extract_main_text;

pub struct Hydrator {
    store: FactStore,
    client: BrowserlessClient,
    conc_hydrate: usize,
    t_fetch: Duration,
    max_attempts: i32,
}

impl Hydrator {
    pub fn new(
        store: FactStore,
        browserless_url: &str,
        browserless_token: Option<&str>,
        conc_hydrate: usize,
        t_fetch: Duration,
        max_attempts: i32,
    ) -> Self {
        Self {
            store,
            client: BrowserlessClient::new(browserless_url, browserless_token),
            conc_hydrate,
            t_fetch,
            max_attempts,
        }
    }

    /// Claim up to `batch_hydrate` PENDING articles and fetch their bodies,
    /// bounded to `conc_hydrate` concurrent fetches. Returns the number of
    /// articles successfully hydrated.
    pub async fn hydrate_once(&self, batch_hydrate: i64) -> i32 {
        let candidates = match self.store.claim_hydrate_batch(batch_hydrate).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "failed to claim hydrate batch");
                return 0;
            }
        };

        let results: Vec<bool> = stream::iter(candidates.into_iter())
            .map(|c| self.hydrate_one(c))
            .buffer_unordered(self.conc_hydrate.max(1))
            .collect()
            .await;

        let hydrated = results.into_iter().filter(|ok| *ok).count() as i32;
        info!(hydrated, "hydrate pass complete");
        hydrated
    }

    async fn hydrate_one(&self, candidate: kg_store::HydrateCandidate) -> bool {
        let fetched = tokio::time::timeout(self.t_fetch, self.client.content(&candidate.url)).await;

        let html = match fetched {
            Ok(Ok(html)) => html,
            Ok(Err(e)) => {
                warn!(article_id = candidate.article_id, url = candidate.url, error = %e, "hydrate fetch failed");
                self.fail(candidate.article_id).await;
                return false;
            }
            Err(_) => {
                warn!(article_id = candidate.article_id, url = candidate.url, "hydrate fetch timed out");
                self.fail(candidate.article_id).await;
                return false;
            }
        };

        if html.trim().is_empty() {
            warn!(article_id = candidate.article_id, url = candidate.url, "hydrate returned empty page");
            self.fail(candidate.article_id).await;
            return false;
        }

        let main_text = extract_main_text(&html, &candidate.url);
        if let Err(e) = self.store.mark_scraped(candidate.article_id, &main_text).await {
            warn!(article_id = candidate.article_id, error = %e, "failed to persist hydrated text");
            return false;
        }

        true
    }

    async fn fail(&self, article_id: i64) {
        if let Err(e) = self.store.mark_hydrate_failed(article_id, self.max_attempts).await {
            warn!(article_id, error = %e, "failed to record hydrate failure");
        }
    }
}
