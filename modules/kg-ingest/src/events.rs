use kg_store::{FactStore, IngestionSource, NewArticle};
use serde::Deserialize;
use tracing::{info, warn};

const MIN_MENTIONS: i64 = 10;

#[derive(Debug, Deserialize)]
struct EventBatchItem {
    url: String,
    #[serde(default)]
    mentions: i64,
}

/// Downloads the latest events batch from a generic JSON source and ingests
/// rows whose mention count clears the relevance floor.
pub struct EventsWorker {
    store: FactStore,
    client: reqwest::Client,
    batch_url: String,
}

impl EventsWorker {
    pub fn new(store: FactStore, batch_url: String) -> Self {
        Self {
            store,
            client: reqwest::Client::new(),
            batch_url,
        }
    }

    pub async fn ingest_once(&self) -> i32 {
        let items: Vec<EventBatchItem> = match self.fetch_batch().await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "events batch fetch failed, skipping this pass");
                return 0;
            }
        };

        let mut inserted = 0;
        for item in items.into_iter().filter(|i| i.mentions >= MIN_MENTIONS) {
            match self
                .store
                .upsert_article(NewArticle {
                    url: item.url,
                    title: String::new(),
                    publisher: String::new(),
                    source: IngestionSource::Events,
                    published_date: None,
                })
                .await
            {
                Ok(outcome) if outcome.inserted => {
                    if let Err(e) = self.store.enqueue_pending(outcome.article_id).await {
                        warn!(article_id = outcome.article_id, error = %e, "failed to enqueue new article");
                    } else {
                        inserted += 1;
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "event article upsert failed"),
            }
        }

        info!(inserted, "events batch ingested");
        inserted
    }

    async fn fetch_batch(&self) -> anyhow::Result<Vec<EventBatchItem>> {
        let resp = self.client.get(&self.batch_url).send().await?;
        let items = resp.json::<Vec<EventBatchItem>>().await?;
        Ok(items)
    }
}
