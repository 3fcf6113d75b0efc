// [libs/domain/models/src/attempt.rs]
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mission::MissionId;

pub type AttemptId = i64;

/// One record of a handler's run of a mission. Kept forever for history —
/// the store never deletes an Attempt.
///
/// `max_time_interval_ms` is set once at creation (see
/// [`Attempt::max_time_interval`]) and is never mutated afterward; only
/// `last_update_time` and `success` change over the Attempt's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attempt {
    pub id: AttemptId,
    pub handler: String,
    pub mission_id: MissionId,
    pub create_time: DateTime<Utc>,
    pub last_update_time: DateTime<Utc>,
    pub max_time_interval_ms: i64,
    /// Snapshot of `Mission.content` at claim time, for audit/replay. Not
    /// consulted by the claim query.
    pub content: serde_json::Value,
    pub success: bool,
}

impl Attempt {
    /// The heartbeat staleness threshold as a `std::time::Duration`, for
    /// use with Tokio's timers.
    pub fn max_time_interval(&self) -> Duration {
        Duration::from_millis(self.max_time_interval_ms.max(0) as u64)
    }

    /// Half the staleness threshold — the watchdog's heartbeat cadence.
    pub fn heartbeat_period(&self) -> Duration {
        self.max_time_interval() / 2
    }
}
