use std::sync::Arc;

use anyhow::Result;
use kg_common::Config;
use kg_digester::{ClaudeFactExtractor, Digester, VoyageEmbedder};
use kg_graph::GraphClient;
use kg_hydrator::Hydrator;
use kg_ingest::{EventsWorker, FeedSource, RssWorker};
use kg_provenance::ProvenanceHunter;
use kg_publisher::Publisher;
use kg_search_client::SerperClient;
use kg_store::FactStore;
use kg_graph::GraphWriter;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("kg=info".parse()?))
        .init();

    info!("knowledge graph orchestrator starting");

    let config = Config::from_env();
    config.log_redacted();

    let store = FactStore::connect(&config.database_url).await?;
    store.migrate().await?;

    let graph = GraphClient::connect(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password).await?;
    kg_graph::migrate(&graph).await?;

    let feeds: Vec<FeedSource> = config
        .rss_feed_urls
        .iter()
        .map(|raw| {
            let publisher = url::Url::parse(raw)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| raw.clone());
            FeedSource { url: raw.clone(), publisher }
        })
        .collect();

    let rss = RssWorker::new(store.clone(), feeds, config.conc_feeds, config.max_attempts);
    let events = EventsWorker::new(store.clone(), config.events_batch_url.clone());

    let hydrator = Hydrator::new(
        store.clone(),
        &config.browserless_url,
        config.browserless_token.as_deref(),
        config.conc_hydrate,
        config.t_fetch,
        config.max_attempts as i32,
    );

    let extractor = Arc::new(ClaudeFactExtractor::new(&config.anthropic_api_key));
    let embedder = Arc::new(VoyageEmbedder::new(&config.embedder_api_key));
    let digester = Digester::new(
        store.clone(),
        extractor,
        embedder,
        config.t_extract,
        config.t_embed,
        config.t_query,
        config.tau_dedupe,
    );

    let search = Arc::new(SerperClient::new(config.search_api_key.clone()));
    let provenance = ProvenanceHunter::new(store.clone(), search, config.tau_prov);

    let writer = GraphWriter::new(graph.clone());
    let publisher = Publisher::new(store.clone(), writer);

    let orchestrator =
        kg_orchestrator::Orchestrator::new(rss, events, hydrator, digester, provenance, publisher, config);

    orchestrator.run_until_shutdown().await;

    Ok(())
}
