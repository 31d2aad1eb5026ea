use kg_graph::{GraphClient, RankedFact};
use neo4rs::query;

/// The embedding column is fixed at 384 dimensions throughout the pipeline.
pub const EMBEDDING_DIM: usize = 384;

/// Which scoring terms the hybrid query actually contributes, chosen once
/// per request based on what the query embedding looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Hybrid,
    /// An embedding came back but isn't 384-long. Never happens under normal
    /// operation; degrades to pure keyword scoring rather than attempting a
    /// Cypher array op against a query embedding of the wrong shape.
    KeywordOnly,
}

fn choose_strategy(embedding: &Option<Vec<f32>>) -> Strategy {
    match embedding {
        Some(v) if v.len() == EMBEDDING_DIM => Strategy::Hybrid,
        _ => Strategy::KeywordOnly,
    }
}

/// Cosine is computed natively via `reduce()` over the stored and query
/// embedding arrays rather than an ANN vector-index call, so the query runs
/// unmodified against a store with no vector index configured.
const HYBRID_CYPHER: &str = r#"
MATCH (f:Fact)
WITH f,
     reduce(dot = 0.0, i IN range(0, size(f.embedding) - 1) | dot + f.embedding[i] * $qe[i]) AS dotProduct,
     sqrt(reduce(acc = 0.0, x IN f.embedding | acc + x * x)) AS fMag,
     sqrt(reduce(acc = 0.0, x IN $qe | acc + x * x)) AS qMag
WITH f,
     CASE WHEN fMag = 0 OR qMag = 0 THEN 0.0 ELSE dotProduct / (fMag * qMag) END AS cosine,
     CASE WHEN any(v IN $variants WHERE toLower(f.subject) CONTAINS v OR toLower(f.predicate) CONTAINS v OR toLower(f.object) CONTAINS v)
          THEN f.confidence ELSE 0.0 END AS keywordScore
WITH f, ($w_keyword * keywordScore + $w_vector * cosine) AS hybrid
WITH f, hybrid,
     CASE WHEN f.confidence > 0.8 THEN 1.2 ELSE 1.0 END AS confBoost,
     CASE WHEN f.confidence > 0.9 THEN 1.5 ELSE 1.0 END AS highConfBoost
WITH f, (hybrid * f.confidence * confBoost * highConfBoost) AS finalScore
RETURN f.id AS id, f.subject AS subject, f.predicate AS predicate, f.object AS object,
       f.confidence AS confidence, finalScore
ORDER BY finalScore DESC
LIMIT $limit
"#;

const KEYWORD_ONLY_CYPHER: &str = r#"
MATCH (f:Fact)
WITH f,
     CASE WHEN any(v IN $variants WHERE toLower(f.subject) CONTAINS v OR toLower(f.predicate) CONTAINS v OR toLower(f.object) CONTAINS v)
          THEN f.confidence ELSE 0.0 END AS keywordScore
WITH f, ($w_keyword * keywordScore) AS hybrid
WITH f, hybrid,
     CASE WHEN f.confidence > 0.8 THEN 1.2 ELSE 1.0 END AS confBoost,
     CASE WHEN f.confidence > 0.9 THEN 1.5 ELSE 1.0 END AS highConfBoost
WITH f, (hybrid * f.confidence * confBoost * highConfBoost) AS finalScore
RETURN f.id AS id, f.subject AS subject, f.predicate AS predicate, f.object AS object,
       f.confidence AS confidence, finalScore
ORDER BY finalScore DESC
LIMIT $limit
"#;

/// Builds and executes the hybrid keyword + cosine ranking query.
pub async fn rank_facts(
    client: &GraphClient,
    variants: &[String],
    embedding: Option<Vec<f32>>,
    w_keyword: f64,
    w_vector: f64,
    n_results: usize,
) -> Result<Vec<RankedFact>, neo4rs::Error> {
    let strategy = choose_strategy(&embedding);
    let lowered: Vec<String> = variants.iter().map(|v| v.to_lowercase()).collect();

    let cypher = match strategy {
        Strategy::Hybrid => HYBRID_CYPHER,
        Strategy::KeywordOnly => KEYWORD_ONLY_CYPHER,
    };

    let mut q = query(cypher)
        .param("variants", lowered)
        .param("w_keyword", w_keyword)
        .param("w_vector", w_vector)
        .param("limit", n_results as i64);

    if strategy == Strategy::Hybrid {
        let qe: Vec<f64> = embedding.unwrap().into_iter().map(|x| x as f64).collect();
        q = q.param("qe", qe);
    }

    let mut stream = client.inner().execute(q).await?;
    let mut out = Vec::new();
    while let Some(row) = stream.next().await? {
        let id: i64 = row.get("id").unwrap_or_default();
        let subject: String = row.get("subject").unwrap_or_default();
        let predicate: String = row.get("predicate").unwrap_or_default();
        let object: String = row.get("object").unwrap_or_default();
        let confidence: f64 = row.get("confidence").unwrap_or(0.0);
        let relevance: f64 = row.get("finalScore").unwrap_or(0.0);

        out.push(RankedFact {
            id,
            statement: format!("{subject} {predicate} {object}"),
            subject,
            predicate,
            object,
            confidence,
            relevance,
        });
    }
    Ok(out)
}
