use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use kg_retrieval::AnswerError;
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NaturalQueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct NaturalQueryResponse {
    pub success: bool,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub results: Vec<kg_graph::RankedFact>,
    pub count: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

pub async fn query_natural(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NaturalQueryRequest>,
) -> impl IntoResponse {
    match state.engine.answer(&req.query).await {
        Ok(results) => {
            let count = results.len();
            (
                StatusCode::OK,
                Json(NaturalQueryResponse {
                    success: true,
                    query: req.query,
                    error: None,
                    results,
                    count,
                    timestamp: chrono::Utc::now(),
                }),
            )
        }
        Err(AnswerError::QueryTooLong) => (
            StatusCode::BAD_REQUEST,
            Json(NaturalQueryResponse {
                success: false,
                query: req.query,
                error: Some("query exceeds maximum length".to_string()),
                results: Vec::new(),
                count: 0,
                timestamp: chrono::Utc::now(),
            }),
        ),
        Err(AnswerError::GraphUnavailable) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(NaturalQueryResponse {
                success: false,
                query: req.query,
                error: Some("unavailable".to_string()),
                results: Vec::new(),
                count: 0,
                timestamp: chrono::Utc::now(),
            }),
        ),
    }
}

pub async fn fact_graph(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.reader.fact_graph(id).await {
        Ok(value) => (StatusCode::OK, Json(value)),
        Err(e) => {
            tracing::warn!(fact_id = id, error = %e, "fact graph lookup failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "success": false, "error": "unavailable" })),
            )
        }
    }
}

pub async fn health() -> &'static str {
    "ok"
}
