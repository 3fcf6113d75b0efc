// [libs/core/panel/src/parallel.rs]
//! The N-way parallel handler runtime: a bounded channel of worker tokens
//! plus a serialization lock around claim+attempt-insert, so concurrent
//! workers never claim the same mission twice.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use missionpanel_models::Mission;
use missionpanel_store::MissionStore;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::error::PanelError;
use crate::handler::Handler;
use crate::watchdog::{self, LockedReporter};

const DEFAULT_CANDIDATE_LIMIT: i64 = 20;

pub struct ParallelHandlerRuntime {
    store: Arc<dyn MissionStore>,
    handler: Arc<dyn Handler>,
    tags: Vec<String>,
    parallelism: usize,
    candidate_limit: i64,
    serialization_lock: Arc<Mutex<()>>,
}

impl ParallelHandlerRuntime {
    pub fn new(store: Arc<dyn MissionStore>, handler: Arc<dyn Handler>, tags: Vec<String>, parallelism: usize) -> Self {
        Self {
            store,
            handler,
            tags,
            parallelism: parallelism.max(1),
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            serialization_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Runs up to `parallelism` `execute_mission` tasks concurrently until
    /// the claim query finds nothing eligible, then awaits every
    /// outstanding task before returning (graceful shutdown). Returns how
    /// many Attempts were run.
    #[instrument(skip(self))]
    pub async fn run_all(&self) -> Result<u64, PanelError> {
        let (token_tx, mut token_rx) = mpsc::channel::<usize>(self.parallelism);
        for slot in 0..self.parallelism {
            token_tx.send(slot).await.expect("token channel just created, cannot be closed");
        }

        let completed = Arc::new(AtomicU64::new(0));
        let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

        loop {
            let Some(slot) = token_rx.recv().await else { break };

            let claimed = self.claim_under_lock().await?;
            let Some((mission, attempt)) = claimed else {
                // Driver exits; the token is simply not returned.
                break;
            };

            info!(mission_id = mission.id, attempt_id = attempt.id, slot, "dispatching mission to worker slot");

            let handler = Arc::clone(&self.handler);
            let reporter =
                LockedReporter { store: Arc::clone(&self.store), lock: Arc::clone(&self.serialization_lock) };
            let completed = Arc::clone(&completed);
            let token_tx = token_tx.clone();

            let task = tokio::spawn(async move {
                let _ = watchdog::run(&handler, &reporter, mission, attempt).await;
                completed.fetch_add(1, Ordering::SeqCst);
                let _ = token_tx.send(slot).await;
            });
            in_flight.push(task);
        }

        for task in in_flight {
            let _ = task.await;
        }

        Ok(completed.load(Ordering::SeqCst))
    }

    /// Claims one eligible mission under the serialization lock. Held from
    /// the start of the claim query until the Attempt row is committed, so
    /// a second worker's claim observes the first worker's Attempt as
    /// in-flight rather than racing it.
    async fn claim_under_lock(&self) -> Result<Option<(Mission, missionpanel_models::Attempt)>, PanelError> {
        let _guard = self.serialization_lock.lock().await;

        let max_time_interval_ms = self.handler.max_time_interval().as_millis() as i64;
        let candidates = self.store.todo_missions(&self.tags, self.candidate_limit).await?;
        let Some(chosen) = self.handler.select_mission(&candidates) else {
            return Ok(None);
        };

        match self.store.claim_specific(chosen.id, self.handler.name(), max_time_interval_ms).await? {
            Some(attempt) => Ok(Some((chosen, attempt))),
            None => Ok(None),
        }
    }
}
