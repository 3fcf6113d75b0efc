// [libs/core/panel/src/watchdog.rs]
//! The watchdog loop shared by the single-worker and parallel runtimes:
//! spawn `execute_mission`, heartbeat on a `max_time_interval / 2` cadence
//! until it finishes, then write the final success bit. Heartbeat/complete
//! writes go through an `AttemptReporter` so the parallel runtime can route
//! them through its serialization lock without duplicating this loop.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use missionpanel_models::{Attempt, Mission};
use missionpanel_store::MissionStore;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::PanelError;
use crate::handler::Handler;

#[async_trait]
pub(crate) trait AttemptReporter: Send + Sync {
    async fn heartbeat(&self, attempt_id: i64) -> Result<(), PanelError>;
    async fn complete(&self, attempt_id: i64, success: bool) -> Result<(), PanelError>;
}

/// Reports directly against the store — used by the single-worker runtime,
/// which has no concurrent writers to serialize against.
pub(crate) struct PlainReporter(pub Arc<dyn MissionStore>);

#[async_trait]
impl AttemptReporter for PlainReporter {
    async fn heartbeat(&self, attempt_id: i64) -> Result<(), PanelError> {
        Ok(self.0.heartbeat_attempt(attempt_id).await?)
    }

    async fn complete(&self, attempt_id: i64, success: bool) -> Result<(), PanelError> {
        Ok(self.0.complete_attempt(attempt_id, success).await?)
    }
}

/// Reports under a shared serialization lock — used by the parallel
/// runtime, per the spec's "report/heartbeat writes from concurrent
/// workers also acquire the serialization lock" requirement.
pub(crate) struct LockedReporter {
    pub store: Arc<dyn MissionStore>,
    pub lock: Arc<Mutex<()>>,
}

#[async_trait]
impl AttemptReporter for LockedReporter {
    async fn heartbeat(&self, attempt_id: i64) -> Result<(), PanelError> {
        let _guard = self.lock.lock().await;
        Ok(self.store.heartbeat_attempt(attempt_id).await?)
    }

    async fn complete(&self, attempt_id: i64, success: bool) -> Result<(), PanelError> {
        let _guard = self.lock.lock().await;
        Ok(self.store.complete_attempt(attempt_id, success).await?)
    }
}

/// Runs `execute_mission` to completion, heartbeating the Attempt while it
/// is in flight. A handler panic or `Err` is logged and treated as a
/// failed Attempt, not propagated; a reporter (store) failure during a
/// heartbeat or the final report does propagate.
pub(crate) async fn run(
    handler: &Arc<dyn Handler>,
    reporter: &dyn AttemptReporter,
    mission: Mission,
    attempt: Attempt,
) -> Result<Attempt, PanelError> {
    let handler_for_task = Arc::clone(handler);
    let mission_for_task = mission.clone();
    let attempt_for_task = attempt.clone();

    let mut task =
        tokio::spawn(async move { handler_for_task.execute_mission(&mission_for_task, &attempt_for_task).await });

    let heartbeat_period = attempt.heartbeat_period().max(Duration::from_millis(1));

    let success = loop {
        tokio::select! {
            result = &mut task => {
                break match result {
                    Ok(Ok(success)) => success,
                    Ok(Err(err)) => {
                        warn!(mission_id = mission.id, attempt_id = attempt.id, error = %err, "execute_mission failed");
                        false
                    }
                    Err(join_err) => {
                        warn!(mission_id = mission.id, attempt_id = attempt.id, error = %join_err, "execute_mission task panicked");
                        false
                    }
                };
            }
            _ = tokio::time::sleep(heartbeat_period) => {
                reporter.heartbeat(attempt.id).await?;
            }
        }
    };

    reporter.complete(attempt.id, success).await?;
    Ok(Attempt { success, ..attempt })
}
