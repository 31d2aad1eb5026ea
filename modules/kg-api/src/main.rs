use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use kg_api::handlers::{fact_graph, health, query_natural};
use kg_api::AppState;
use kg_common::Config;
use kg_graph::{GraphClient, GraphReader};
use kg_retrieval::{ClaudeQueryExpander, RetrievalEngine, VoyageQueryEmbedder};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("kg=info".parse()?))
        .init();

    let config = Config::from_env();
    config.log_redacted();

    let client = GraphClient::connect(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password).await?;
    kg_graph::migrate(&client).await?;

    let expander = Arc::new(ClaudeQueryExpander::new(&config.anthropic_api_key));
    let embedder = Arc::new(VoyageQueryEmbedder::new(&config.embedder_api_key));

    let engine = RetrievalEngine::new(
        client.clone(),
        expander,
        embedder,
        config.n_expand,
        config.n_results,
        config.w_keyword,
        config.w_vector,
        config.t_query,
    );
    let reader = GraphReader::new(client);

    let state = Arc::new(AppState { engine, reader });

    let app = Router::new()
        .route("/", get(health))
        .route("/query/natural", post(query_natural))
        .route("/fact_graph/{id}", get(fact_graph))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("knowledge graph api listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
