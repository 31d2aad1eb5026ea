use std::future::Future;
use std::time::{Duration, Instant};

use kg_common::StageSummary;
use tracing::{error, info};

/// One entry in the fixed rotation: a name, a cadence, and the last time it
/// actually ran. The rotation advances a tick at a time rather than spawning
/// one task per stage, so only one stage is ever mid-flight — this matches
/// the "no in-process mutable state shared across stages" requirement, since
/// every stage borrows the same store/graph clients sequentially.
pub struct Stage {
    pub name: &'static str,
    pub cadence: Duration,
    last_run: Option<Instant>,
}

impl Stage {
    pub fn new(name: &'static str, cadence: Duration) -> Self {
        Self { name, cadence, last_run: None }
    }

    fn is_due(&self, now: Instant) -> bool {
        match self.last_run {
            None => true,
            Some(last) => now.duration_since(last) >= self.cadence,
        }
    }
}

/// Runs `work` under a `T_STAGE` deadline and a once-a-second heartbeat,
/// folding the result into a `StageSummary` regardless of how `work` fails.
/// Stage functions never propagate an error across this boundary.
pub async fn run_stage<F, Fut>(name: &'static str, t_stage: Duration, work: F) -> StageSummary
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = StageSummary>,
{
    info!(stage = name, "stage starting");

    let heartbeat = tokio::spawn({
        let name = name;
        async move {
            let mut tick = tokio::time::interval(Duration::from_secs(1));
            loop {
                tick.tick().await;
                info!(stage = name, "heartbeat");
            }
        }
    });

    let result = tokio::time::timeout(t_stage, work()).await;
    heartbeat.abort();

    match result {
        Ok(summary) => {
            info!(
                stage = name,
                processed = summary.processed,
                skipped = summary.skipped,
                failed = summary.failed,
                "stage complete"
            );
            summary
        }
        Err(_) => {
            error!(stage = name, budget_secs = t_stage.as_secs(), "stage exceeded T_STAGE, abandoning this pass");
            StageSummary { processed: 0, skipped: 0, failed: 1 }
        }
    }
}

/// A rotation of stages, advanced one tick at a time by the caller.
pub struct Rotation {
    stages: Vec<Stage>,
}

impl Rotation {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Returns the index of the next due stage, marking it run at `now`. If
    /// nothing is due, returns `None` and the caller should sleep briefly.
    pub fn next_due(&mut self, now: Instant) -> Option<usize> {
        let idx = self.stages.iter().position(|s| s.is_due(now))?;
        self.stages[idx].last_run = Some(now);
        Some(idx)
    }

    pub fn name(&self, idx: usize) -> &'static str {
        self.stages[idx].name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_run_stage_is_immediately_due() {
        let stage = Stage::new("ingest", Duration::from_secs(1800));
        assert!(stage.is_due(Instant::now()));
    }

    #[test]
    fn rotation_picks_first_due_stage_in_order() {
        let mut rotation = Rotation::new(vec![
            Stage::new("ingest", Duration::from_secs(1800)),
            Stage::new("digest", Duration::from_secs(300)),
        ]);
        let now = Instant::now();
        let idx = rotation.next_due(now).unwrap();
        assert_eq!(rotation.name(idx), "ingest");
    }

    #[test]
    fn rotation_returns_none_when_nothing_due() {
        let mut rotation = Rotation::new(vec![Stage::new("digest", Duration::from_secs(300))]);
        let now = Instant::now();
        rotation.next_due(now);
        assert!(rotation.next_due(now).is_none());
    }
}
