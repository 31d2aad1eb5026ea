use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use kg_store::{FactStore, IngestionSource, NewArticle};
use tracing::{info, warn};

const RSS_MAX_ITEMS: usize = 20;
const RSS_MAX_AGE_DAYS: i64 = 30;

/// A feed this deployment trusts, with the publisher name to attribute to it
/// (RSS entries rarely carry a clean publisher field of their own).
#[derive(Debug, Clone)]
pub struct FeedSource {
    pub url: String,
    pub publisher: String,
}

pub struct RssWorker {
    store: FactStore,
    client: reqwest::Client,
    feeds: Vec<FeedSource>,
    conc_feeds: usize,
    max_attempts: u32,
}

struct FeedEntry {
    url: String,
    title: String,
    published_date: Option<DateTime<Utc>>,
}

impl RssWorker {
    pub fn new(store: FactStore, feeds: Vec<FeedSource>, conc_feeds: usize, max_attempts: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to build RSS HTTP client");
        Self {
            store,
            client,
            feeds,
            conc_feeds,
            max_attempts,
        }
    }

    /// Poll every configured feed and upsert any new entries. Returns the
    /// number of newly-inserted articles. Idempotent on `url`.
    pub async fn ingest_once(&self) -> i32 {
        let results: Vec<i32> = stream::iter(self.feeds.iter())
            .map(|feed| self.ingest_feed(feed))
            .buffer_unordered(self.conc_feeds.max(1))
            .collect()
            .await;
        results.into_iter().sum()
    }

    async fn ingest_feed(&self, feed: &FeedSource) -> i32 {
        let bytes = match self.fetch_with_retry(&feed.url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(feed = feed.url, error = %e, "RSS fetch failed after retries, skipping feed");
                return 0;
            }
        };

        let parsed = match feed_rs::parser::parse(&bytes[..]) {
            Ok(p) => p,
            Err(e) => {
                warn!(feed = feed.url, error = %e, "RSS parse failed, skipping feed");
                return 0;
            }
        };

        let entries = filter_and_rank_entries(parsed.entries, Utc::now());

        let mut inserted = 0;
        for entry in entries {
            match self
                .store
                .upsert_article(NewArticle {
                    url: entry.url,
                    title: entry.title,
                    publisher: feed.publisher.clone(),
                    source: IngestionSource::Rss,
                    published_date: entry.published_date,
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
                Err(e) => warn!(feed = feed.url, error = %e, "article upsert failed"),
            }
        }

        info!(feed = feed.url, inserted, "RSS feed ingested");
        inserted
    }

    async fn fetch_with_retry(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).header("User-Agent", "kg-ingest/0.1").send().await {
                Ok(resp) => return Ok(resp.bytes().await?.to_vec()),
                Err(e) if attempt < self.max_attempts => {
                    let backoff = Duration::from_millis(200 * 2u64.pow(attempt));
                    warn!(url, attempt, error = %e, "transient RSS fetch failure, retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Drop stale entries (older than `RSS_MAX_AGE_DAYS`) and entries with no
/// usable link, then rank by recency and cap at `RSS_MAX_ITEMS`.
fn filter_and_rank_entries(entries: Vec<feed_rs::model::Entry>, now: DateTime<Utc>) -> Vec<FeedEntry> {
    let cutoff = now - chrono::Duration::days(RSS_MAX_AGE_DAYS);
    let mut entries: Vec<FeedEntry> = entries
        .into_iter()
        .filter_map(|entry| {
            let url = entry.links.first().map(|l| l.href.clone())?;
            let published_date = entry
                .published
                .or(entry.updated)
                .map(|dt| dt.with_timezone(&Utc));
            if let Some(date) = published_date {
                if date < cutoff {
                    return None;
                }
            }
            Some(FeedEntry {
                url,
                title: entry.title.map(|t| t.content).unwrap_or_default(),
                published_date,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.published_date.cmp(&a.published_date));
    entries.truncate(RSS_MAX_ITEMS);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with(url: &str, days_ago: i64) -> feed_rs::model::Entry {
        let mut entry = feed_rs::model::Entry::default();
        entry.links.push(feed_rs::model::Link {
            href: url.to_string(),
            rel: None,
            media_type: None,
            href_lang: None,
            title: None,
            length: None,
        });
        entry.published = Some(Utc::now() - chrono::Duration::days(days_ago));
        entry
    }

    #[test]
    fn drops_entries_older_than_max_age() {
        let entries = vec![entry_with("https://example.com/fresh", 1), entry_with("https://example.com/stale", 60)];
        let filtered = filter_and_rank_entries(entries, Utc::now());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].url, "https://example.com/fresh");
    }

    #[test]
    fn caps_at_rss_max_items() {
        let entries: Vec<_> = (0..30).map(|i| entry_with(&format!("https://example.com/{i}"), 0)).collect();
        let filtered = filter_and_rank_entries(entries, Utc::now());
        assert_eq!(filtered.len(), RSS_MAX_ITEMS);
    }

    #[test]
    fn skips_entries_without_a_link() {
        let entries = vec![feed_rs::model::Entry::default()];
        let filtered = filter_and_rank_entries(entries, Utc::now());
        assert!(filtered.is_empty());
    }
}
