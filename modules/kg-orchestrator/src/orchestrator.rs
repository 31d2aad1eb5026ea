use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use kg_common::{Config, StageSummary};
use kg_digester::Digester;
use kg_hydrator::Hydrator;
use kg_ingest::{EventsWorker, RssWorker};
use kg_provenance::ProvenanceHunter;
use kg_publisher::Publisher;
use tracing::info;

use crate::stage::{run_stage, Rotation, Stage};

const POLL_IDLE: Duration = Duration::from_millis(500);

/// Owns one instance of every stage and drives them through a fixed
/// rotation. Mutated only from the task that calls `run()` — no stage holds
/// a reference back to the Orchestrator itself.
pub struct Orchestrator {
    rss: RssWorker,
    events: EventsWorker,
    hydrator: Hydrator,
    digester: Digester,
    provenance: ProvenanceHunter,
    publisher: Publisher,
    config: Config,
    shutdown: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(
        rss: RssWorker,
        events: EventsWorker,
        hydrator: Hydrator,
        digester: Digester,
        provenance: ProvenanceHunter,
        publisher: Publisher,
        config: Config,
    ) -> Self {
        Self {
            rss,
            events,
            hydrator,
            digester,
            provenance,
            publisher,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Drives the fixed rotation until a shutdown signal is observed. On
    /// termination, the loop simply stops advancing — no lock is held across
    /// the shutdown check, so there is nothing for the signal handler to
    /// deadlock against.
    pub async fn run_until_shutdown(mut self) {
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("received shutdown signal");
            shutdown.store(true, Ordering::SeqCst);
        });

        let mut rotation = Rotation::new(vec![
            Stage::new("ingest", Duration::from_secs(30 * 60)),
            Stage::new("hydrate", Duration::from_secs(30 * 60)),
            Stage::new("digest", Duration::from_secs(5 * 60)),
            Stage::new("provenance", Duration::from_secs(10 * 60)),
            Stage::new("publish", Duration::from_secs(60 * 60)),
        ]);

        info!("orchestrator starting fixed rotation");

        while !self.shutdown.load(Ordering::SeqCst) {
            let now = Instant::now();
            match rotation.next_due(now) {
                Some(idx) => self.run_one(rotation.name(idx)).await,
                None => tokio::time::sleep(POLL_IDLE).await,
            }
        }

        info!("orchestrator stopped");
    }

    async fn run_one(&mut self, name: &'static str) {
        let t_stage = self.config.t_stage;
        match name {
            "ingest" => {
                run_stage("ingest", t_stage, || async {
                    let rss = self.rss.ingest_once().await;
                    let events = self.events.ingest_once().await;
                    StageSummary { processed: (rss + events).max(0) as u32, skipped: 0, failed: 0 }
                })
                .await;
            }
            "hydrate" => {
                run_stage("hydrate", t_stage, || async {
                    let hydrated = self.hydrator.hydrate_once(self.config.batch_hydrate as i64).await;
                    StageSummary { processed: hydrated.max(0) as u32, skipped: 0, failed: 0 }
                })
                .await;
            }
            "digest" => {
                run_stage("digest", t_stage, || self.digester.digest_once(self.config.batch_digest as i64)).await;
            }
            "provenance" => {
                run_stage("provenance", t_stage, || self.provenance.hunt_once(self.config.batch_prov as i64)).await;
            }
            "publish" => {
                run_stage("publish", t_stage, || self.publisher.sync_once()).await;
            }
            other => unreachable!("unknown stage in rotation: {other}"),
        }
    }
}
