// [libs/core/panel/src/handler.rs]
//! The single-worker claim/watchdog runtime: `run_once`/`run_all`, Attempt
//! creation, and the heartbeat loop that keeps a running Attempt from going
//! stale while `execute_mission` is in flight.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use missionpanel_models::{Attempt, Mission};
use missionpanel_store::MissionStore;
use tracing::instrument;

use crate::error::PanelError;
use crate::watchdog::{self, PlainReporter};

/// How many eligible candidates `run_once` materializes before asking
/// `select_mission` to pick one. The default policy only looks at the
/// first, but a handler with a richer policy may want to see further down
/// the queue.
const DEFAULT_CANDIDATE_LIMIT: i64 = 20;

#[async_trait]
pub trait Handler: Send + Sync {
    fn name(&self) -> &str;

    /// The heartbeat staleness threshold. Halved internally for the
    /// watchdog's heartbeat cadence.
    fn max_time_interval(&self) -> Duration;

    /// Policy hook: pick a mission out of the eligible candidates, oldest
    /// first. Returning `None` means "nothing to do this tick." The
    /// default takes the first candidate.
    fn select_mission(&self, candidates: &[Mission]) -> Option<Mission> {
        candidates.first().cloned()
    }

    /// The mission's body. A truthy return marks the Attempt successful.
    async fn execute_mission(&self, mission: &Mission, attempt: &Attempt) -> anyhow::Result<bool>;
}

pub struct HandlerRuntime {
    store: Arc<dyn MissionStore>,
    handler: Arc<dyn Handler>,
    tags: Vec<String>,
    candidate_limit: i64,
}

impl HandlerRuntime {
    pub fn new(store: Arc<dyn MissionStore>, handler: Arc<dyn Handler>, tags: Vec<String>) -> Self {
        Self { store, handler, tags, candidate_limit: DEFAULT_CANDIDATE_LIMIT }
    }

    /// One claim/execute/report cycle. Returns the Attempt, or `None` if
    /// nothing was eligible (or the caller's pick lost a race to another
    /// handler — that also resolves to "nothing this tick").
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> Result<Option<Attempt>, PanelError> {
        let candidates = self.store.todo_missions(&self.tags, self.candidate_limit).await?;
        let Some(chosen) = self.handler.select_mission(&candidates) else {
            return Ok(None);
        };

        let max_time_interval_ms = self.handler.max_time_interval().as_millis() as i64;
        let Some(attempt) = self.store.claim_specific(chosen.id, self.handler.name(), max_time_interval_ms).await?
        else {
            return Ok(None);
        };

        let reporter = PlainReporter(Arc::clone(&self.store));
        let attempt = watchdog::run(&self.handler, &reporter, chosen, attempt).await?;
        Ok(Some(attempt))
    }

    /// Repeats `run_once` until a cycle finds nothing eligible. Returns how
    /// many Attempts were run.
    pub async fn run_all(&self) -> Result<u64, PanelError> {
        let mut completed = 0u64;
        while self.run_once().await?.is_some() {
            completed += 1;
        }
        Ok(completed)
    }
}
