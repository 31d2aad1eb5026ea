use chrono::{DateTime, Utc};
use pgvector::Vector;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;

use crate::error::{Result, StoreError};
use crate::models::{
    ArticleRow, DigestCandidate, FactRow, HydrateCandidate, IngestionSource, InternalMatch,
    NewArticle, NewFact, ProvenanceCandidate, PublishableArticle, PublishableFact, UpsertOutcome,
};

/// Authoritative store for articles, the processing queue, and extracted facts.
///
/// Every timeout here is enforced by the caller wrapping each call in
/// `tokio::time::timeout`, not by a server-side session setting, because the
/// pool may sit behind a transaction-mode pooler that discards session state
/// between transactions.
#[derive(Clone)]
pub struct FactStore {
    pool: PgPool,
}

impl FactStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(StoreError::Migration)?;
        Ok(())
    }

    // ---- Ingest ----------------------------------------------------

    /// Idempotent upsert by `url`. Returns the article id and whether a new
    /// row was inserted.
    pub async fn upsert_article(&self, new: NewArticle) -> Result<UpsertOutcome> {
        let inserted_id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO articles (url, title, publisher, ingestion_source, published_date)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (url) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&new.url)
        .bind(&new.title)
        .bind(&new.publisher)
        .bind(new.source.as_str())
        .bind(new.published_date)
        .fetch_optional(&self.pool)
        .await?;

        match inserted_id {
            Some(id) => Ok(UpsertOutcome {
                article_id: id,
                inserted: true,
            }),
            None => {
                let id: i64 = sqlx::query_scalar("SELECT id FROM articles WHERE url = $1")
                    .bind(&new.url)
                    .fetch_one(&self.pool)
                    .await?;
                Ok(UpsertOutcome {
                    article_id: id,
                    inserted: false,
                })
            }
        }
    }

    pub async fn enqueue_pending(&self, article_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO processing_queue (article_id, status, attempts)
            VALUES ($1, 'PENDING', 0)
            ON CONFLICT (article_id) DO NOTHING
            "#,
        )
        .bind(article_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_reference_article(
        &self,
        url: &str,
        published_date: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let outcome = self
            .upsert_article(NewArticle {
                url: url.to_string(),
                title: String::new(),
                publisher: String::new(),
                source: IngestionSource::Events,
                published_date,
            })
            .await?;
        sqlx::query("UPDATE articles SET is_reference = TRUE WHERE id = $1")
            .bind(outcome.article_id)
            .execute(&self.pool)
            .await?;
        Ok(outcome.article_id)
    }

    // ---- Hydrator ----------------------------------------------------

    pub async fn claim_hydrate_batch(&self, limit: i64) -> Result<Vec<HydrateCandidate>> {
        let rows = sqlx::query_as::<_, HydrateCandidate>(
            r#"
            SELECT a.id AS article_id, a.url, q.attempts
            FROM articles a
            JOIN processing_queue q ON q.article_id = a.id
            WHERE a.raw_text IS NULL AND q.status = 'PENDING'
            ORDER BY a.id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn mark_scraped(&self, article_id: i64, raw_text: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE articles SET raw_text = $1 WHERE id = $2")
            .bind(raw_text)
            .bind(article_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE processing_queue SET status = 'SCRAPED' WHERE article_id = $1")
            .bind(article_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Record a failed hydration attempt. Marks the queue entry FAILED once
    /// `max_attempts` is reached; otherwise leaves it PENDING for retry.
    pub async fn mark_hydrate_failed(&self, article_id: i64, max_attempts: i32) -> Result<()> {
        let attempts: i32 = sqlx::query_scalar(
            "UPDATE processing_queue SET attempts = attempts + 1 WHERE article_id = $1 RETURNING attempts",
        )
        .bind(article_id)
        .fetch_one(&self.pool)
        .await?;

        if attempts >= max_attempts {
            sqlx::query("UPDATE processing_queue SET status = 'FAILED' WHERE article_id = $1")
                .bind(article_id)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    // ---- Digester ----------------------------------------------------

    pub async fn claim_digest_batch(&self, limit: i64) -> Result<Vec<DigestCandidate>> {
        let rows = sqlx::query_as::<_, DigestCandidate>(
            r#"
            SELECT id, url, raw_text
            FROM articles
            WHERE processed_at IS NULL AND raw_text IS NOT NULL AND url IS NOT NULL
            ORDER BY id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Nearest existing fact by cosine distance, across the whole dedupe
    /// scope (global, not per-article — see design notes on dedupe scope).
    pub async fn find_nearest_fact(&self, embedding: &Vector) -> Result<Option<(i64, f64)>> {
        let row: Option<(i64, f64)> = sqlx::query_as(
            r#"
            SELECT id, (embedding <=> $1) AS distance
            FROM extracted_facts
            ORDER BY embedding <=> $1
            LIMIT 1
            "#,
        )
        .bind(embedding)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Commit the article's processed stamp together with any facts survived
    /// by the dedupe gate, in one transaction — the only locks the Digester
    /// holds are on this one article row and its new fact rows.
    pub async fn stamp_article_with_facts(
        &self,
        article_id: i64,
        facts: Vec<NewFact>,
    ) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let inserted = Self::insert_facts(&mut tx, article_id, facts).await?;
        sqlx::query("UPDATE articles SET processed_at = now() WHERE id = $1")
            .bind(article_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(inserted)
    }

    async fn insert_facts(
        tx: &mut Transaction<'_, Postgres>,
        article_id: i64,
        facts: Vec<NewFact>,
    ) -> Result<usize> {
        let mut inserted = 0;
        for fact in facts {
            let result = sqlx::query(
                r#"
                INSERT INTO extracted_facts
                    (article_id, subject, predicate, object, confidence, embedding, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, now())
                "#,
            )
            .bind(article_id)
            .bind(&fact.subject)
            .bind(&fact.predicate)
            .bind(&fact.object)
            .bind(fact.confidence)
            .bind(&fact.embedding)
            .execute(&mut **tx)
            .await;

            match result {
                Ok(_) => inserted += 1,
                Err(e) => warn!(article_id, error = %e, "fact insert failed, continuing"),
            }
        }
        Ok(inserted)
    }

    // ---- Provenance Hunter ----------------------------------------------------

    pub async fn claim_provenance_batch(&self, limit: i64) -> Result<Vec<ProvenanceCandidate>> {
        let rows = sqlx::query_as::<_, ProvenanceCandidate>(
            r#"
            SELECT f.id, f.article_id, f.subject, f.predicate, f.object, f.embedding,
                   a.published_date AS article_published_date
            FROM extracted_facts f
            JOIN articles a ON a.id = f.article_id
            WHERE f.checked_at IS NULL AND f.embedding IS NOT NULL
            ORDER BY f.id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Earliest internal fact within `tau_prov` whose source article predates
    /// `before`. Returns `None` when `before` is unknown (no priority claim
    /// can be established) or nothing qualifies.
    pub async fn find_older_internal_match(
        &self,
        fact_id: i64,
        embedding: &Vector,
        before: Option<DateTime<Utc>>,
        tau_prov: f64,
    ) -> Result<Option<InternalMatch>> {
        let Some(before) = before else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, InternalMatch>(
            r#"
            SELECT f.id AS fact_id, (f.embedding <=> $1) AS distance
            FROM extracted_facts f
            JOIN articles a ON a.id = f.article_id
            WHERE f.id != $2
              AND (f.embedding <=> $1) <= $3
              AND a.published_date < $4
            ORDER BY a.published_date ASC
            LIMIT 1
            "#,
        )
        .bind(embedding)
        .bind(fact_id)
        .bind(tau_prov)
        .bind(before)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn stamp_provenance(
        &self,
        fact_id: i64,
        is_original: bool,
        provenance_id: Option<i64>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE extracted_facts
            SET checked_at = now(), is_original = $1, provenance_id = $2
            WHERE id = $3
            "#,
        )
        .bind(is_original)
        .bind(provenance_id)
        .bind(fact_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ---- Publisher ----------------------------------------------------

    /// Quality Gate A: facts confirmed original and already checked.
    pub async fn select_publishable_facts(&self) -> Result<Vec<PublishableFact>> {
        let rows = sqlx::query_as::<_, PublishableFact>(
            r#"
            SELECT id, article_id, subject, predicate, object, confidence, embedding,
                   is_original, provenance_id
            FROM extracted_facts
            WHERE is_original = TRUE AND checked_at IS NOT NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Quality Gate B: processed originals plus reference articles.
    pub async fn select_publishable_articles(&self) -> Result<Vec<PublishableArticle>> {
        let rows = sqlx::query_as::<_, PublishableArticle>(
            r#"
            SELECT id, title, url, published_date, is_reference
            FROM articles
            WHERE (processed_at IS NOT NULL AND is_reference = FALSE) OR is_reference = TRUE
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn article_by_id(&self, id: i64) -> Result<Option<ArticleRow>> {
        let row = sqlx::query_as::<_, ArticleRow>("SELECT * FROM articles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn fact_by_id(&self, id: i64) -> Result<Option<FactRow>> {
        let row = sqlx::query_as::<_, FactRow>("SELECT * FROM extracted_facts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
