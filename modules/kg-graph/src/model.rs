use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleNode {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub published_date: Option<DateTime<Utc>>,
    pub is_reference: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactNode {
    pub id: i64,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub confidence: f64,
    pub embedding: Vec<f64>,
}

impl FactNode {
    pub fn text(&self) -> String {
        format!("{} {} {}", self.subject, self.predicate, self.object)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assertion {
    pub article_id: i64,
    pub fact_id: i64,
}

/// A ranked fact returned by the retrieval engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedFact {
    pub id: i64,
    pub statement: String,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub confidence: f64,
    pub relevance: f64,
}
