use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestionSource {
    Rss,
    Events,
}

impl IngestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionSource::Rss => "RSS",
            IngestionSource::Events => "EVENTS",
        }
    }
}

impl From<&str> for IngestionSource {
    fn from(raw: &str) -> Self {
        match raw {
            "EVENTS" => IngestionSource::Events,
            _ => IngestionSource::Rss,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub publisher: String,
    pub ingestion_source: String,
    pub published_date: Option<DateTime<Utc>>,
    pub raw_text: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub is_reference: bool,
}

/// Parameters for upserting a newly-ingested article.
pub struct NewArticle {
    pub url: String,
    pub title: String,
    pub publisher: String,
    pub source: IngestionSource,
    pub published_date: Option<DateTime<Utc>>,
}

/// Outcome of an idempotent upsert-by-url.
#[derive(Debug, Clone, Copy)]
pub struct UpsertOutcome {
    pub article_id: i64,
    pub inserted: bool,
}

/// A queue row joined with its article's URL, ready for hydration.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HydrateCandidate {
    pub article_id: i64,
    pub url: String,
    pub attempts: i32,
}

/// An article ready for digestion: has text, has not been stamped yet.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DigestCandidate {
    pub id: i64,
    pub url: String,
    pub raw_text: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FactRow {
    pub id: i64,
    pub article_id: i64,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub confidence: f64,
    pub embedding: Vector,
    pub created_at: DateTime<Utc>,
    pub checked_at: Option<DateTime<Utc>>,
    pub is_original: Option<bool>,
    pub provenance_id: Option<i64>,
}

impl FactRow {
    pub fn statement(&self) -> String {
        format!("{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// A candidate fact produced by the Extractor, already clamped/validated.
pub struct NewFact {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub confidence: f64,
    pub embedding: Vector,
}

/// A fact awaiting provenance verification, joined with its source article.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProvenanceCandidate {
    pub id: i64,
    pub article_id: i64,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub embedding: Vector,
    pub article_published_date: Option<DateTime<Utc>>,
}

/// Result of the internal nearest-neighbor provenance search.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InternalMatch {
    pub fact_id: i64,
    pub distance: f64,
}

/// A fact that has cleared Quality Gate A, ready for graph projection.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PublishableFact {
    pub id: i64,
    pub article_id: i64,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub confidence: f64,
    pub embedding: Vector,
    pub is_original: bool,
    pub provenance_id: Option<i64>,
}

/// An article that has cleared Quality Gate B, ready for graph projection.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PublishableArticle {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub published_date: Option<DateTime<Utc>>,
    pub is_reference: bool,
}
