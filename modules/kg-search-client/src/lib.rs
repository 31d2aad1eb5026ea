use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// A web search result. `published_date` is `None` when the provider didn't
/// report one — the Provenance Hunter disqualifies any result without a date.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub url: String,
    pub published_date: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

#[derive(Debug, serde::Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, serde::Deserialize)]
struct SerperResult {
    #[serde(default)]
    link: String,
    #[serde(default)]
    date: Option<String>,
}

/// Serper (Google Search) backed implementation.
pub struct SerperClient {
    api_key: String,
    client: reqwest::Client,
}

impl SerperClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl SearchClient for SerperClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        info!(query, "provenance search");

        let body = serde_json::json!({ "q": query, "num": 10 });
        let resp = self
            .client
            .post("https://google.serper.dev/search")
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let data: SerperResponse = match resp.error_for_status() {
            Ok(resp) => resp.json().await?,
            Err(e) => {
                warn!(query, error = %e, "search provider returned an error status");
                return Ok(Vec::new());
            }
        };

        let results: Vec<SearchResult> = data
            .organic
            .into_iter()
            .filter_map(|r| {
                let published_date = r
                    .date
                    .as_deref()
                    .and_then(parse_loose_date);
                if r.link.is_empty() {
                    return None;
                }
                Some(SearchResult {
                    url: r.link,
                    published_date,
                })
            })
            .collect();

        info!(query, count = results.len(), "search complete");
        Ok(results)
    }
}

/// Serper dates are informal strings ("Jan 3, 2024", "3 days ago", ...).
/// Only the unambiguous RFC3339/ISO form is trusted; anything else is
/// treated as absent rather than guessed at.
fn parse_loose_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_loose_date_accepts_rfc3339() {
        assert!(parse_loose_date("2024-01-03T00:00:00Z").is_some());
    }

    #[test]
    fn parse_loose_date_rejects_relative_strings() {
        assert!(parse_loose_date("3 days ago").is_none());
    }
}
