use std::env;
use std::time::Duration;

/// Cloud forces hosted embedder/extractor; local loads bundled models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Cloud,
    Local,
}

impl ExecutionMode {
    fn parse(raw: &str) -> Self {
        match raw {
            "local" => ExecutionMode::Local,
            _ => ExecutionMode::Cloud,
        }
    }
}

/// Pipeline configuration loaded from environment variables.
///
/// Mirrors the recognized option set enumerated in the system design: batch
/// sizes, concurrency caps, deadlines, scoring thresholds/weights, and
/// endpoints/credentials for each external collaborator.
#[derive(Debug, Clone)]
pub struct Config {
    // Relational store
    pub database_url: String,

    // Graph store (bolt protocol)
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,

    // External clients
    pub anthropic_api_key: String,
    pub embedder_api_key: String,
    pub search_api_key: String,
    pub browserless_url: String,
    pub browserless_token: Option<String>,

    // Ingest sources
    pub rss_feed_urls: Vec<String>,
    pub events_batch_url: String,

    pub execution_mode: ExecutionMode,

    // Batch sizes
    pub batch_digest: usize,
    pub batch_prov: usize,
    pub batch_hydrate: usize,

    // Concurrency
    pub conc_hydrate: usize,
    pub conc_feeds: usize,

    // Deadlines
    pub t_fetch: Duration,
    pub t_extract: Duration,
    pub t_embed: Duration,
    pub t_query: Duration,
    pub t_stage: Duration,
    pub t_cancel: Duration,

    pub max_attempts: u32,

    // Scoring thresholds / weights
    pub tau_dedupe: f64,
    pub tau_prov: f64,
    pub n_expand: usize,
    pub n_results: usize,
    pub w_keyword: f64,
    pub w_vector: f64,

    // HTTP facade
    pub api_host: String,
    pub api_port: u16,
}

impl Config {
    /// Load configuration from environment variables. Panics with a clear
    /// message if a required credential or endpoint is missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            neo4j_uri: required_env("NEO4J_URI"),
            neo4j_user: required_env("NEO4J_USER"),
            neo4j_password: required_env("NEO4J_PASSWORD"),

            anthropic_api_key: required_env("ANTHROPIC_API_KEY"),
            embedder_api_key: required_env("EMBEDDER_API_KEY"),
            search_api_key: env::var("SEARCH_API_KEY").unwrap_or_default(),
            browserless_url: required_env("BROWSERLESS_URL"),
            browserless_token: env::var("BROWSERLESS_TOKEN").ok(),

            rss_feed_urls: env::var("RSS_FEED_URLS")
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            events_batch_url: env::var("EVENTS_BATCH_URL").unwrap_or_default(),

            execution_mode: env::var("EXECUTION_MODE")
                .map(|v| ExecutionMode::parse(&v))
                .unwrap_or(ExecutionMode::Cloud),

            batch_digest: env_usize("BATCH_DIGEST", 25),
            batch_prov: env_usize("BATCH_PROV", 25),
            batch_hydrate: env_usize("BATCH_HYDRATE", 10),

            conc_hydrate: env_usize("CONC_HYDRATE", 5),
            conc_feeds: env_usize("CONC_FEEDS", 4),

            t_fetch: env_secs("T_FETCH", 10),
            t_extract: env_secs("T_EXTRACT", 30),
            t_embed: env_secs("T_EMBED", 10),
            t_query: env_secs("T_QUERY", 50),
            t_stage: env_secs("T_STAGE", 240),
            t_cancel: env_secs("T_CANCEL", 5),

            max_attempts: env::var("MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),

            tau_dedupe: env_f64("TAU_DEDUPE", 0.05),
            tau_prov: env_f64("TAU_PROV", 0.15),
            n_expand: env_usize("N_EXPAND", 3),
            n_results: env_usize("N_RESULTS", 15),
            w_keyword: env_f64("W_KEYWORD", 0.5),
            w_vector: env_f64("W_VECTOR", 0.5),

            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("API_PORT must be a number"),
        }
    }

    /// Log the presence (not the value) of sensitive configuration for startup diagnostics.
    pub fn log_redacted(&self) {
        let vars = [
            ("DATABASE_URL", &self.database_url),
            ("NEO4J_URI", &self.neo4j_uri),
            ("NEO4J_USER", &self.neo4j_user),
            ("NEO4J_PASSWORD", &self.neo4j_password),
            ("ANTHROPIC_API_KEY", &self.anthropic_api_key),
            ("EMBEDDER_API_KEY", &self.embedder_api_key),
            ("SEARCH_API_KEY", &self.search_api_key),
        ];
        for (name, value) in vars {
            if value.is_empty() {
                tracing::info!("{name} = (empty)");
            } else {
                tracing::info!("{name} = ({} chars)", value.len());
            }
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_secs(key: &str, default_secs: u64) -> Duration {
    let secs = env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_mode_defaults_to_cloud() {
        assert_eq!(ExecutionMode::parse("anything"), ExecutionMode::Cloud);
        assert_eq!(ExecutionMode::parse("local"), ExecutionMode::Local);
    }

    #[test]
    fn env_usize_falls_back_to_default() {
        env::remove_var("KG_TEST_USIZE_MISSING");
        assert_eq!(env_usize("KG_TEST_USIZE_MISSING", 7), 7);
    }
}
