// [libs/infra/store/src/repositories/claim.rs]
//! The claim query: which missions carry every tag in a handler's tag set
//! and are not currently claimed by a live Attempt.
//!
//! A Mission is "claimed" if it has an Attempt that is either already
//! `success = 1`, or whose heartbeat is still fresh
//! (`last_update_time + max_time_interval_ms >= now`). The spec states
//! this as a left join plus a per-mission count; here it's a `NOT EXISTS`
//! correlated subquery, which lets SQLite use `idx_attempt_liveness`
//! instead of materializing every mission's attempt history.

use libsql::{params_from_iter, Connection, Value};
use missionpanel_models::Mission;
use tracing::instrument;

use crate::errors::StoreError;
use crate::mapping::mission_from_row;

#[derive(Clone)]
pub struct ClaimQuery {
    connection: Connection,
}

impl ClaimQuery {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Missions tagged with every entry in `tags`, oldest first, that have
    /// no live or successful Attempt. `limit` bounds how many candidates a
    /// single `run_once`/worker slot pulls before giving up.
    #[instrument(skip(self))]
    pub async fn todo_missions(&self, tags: &[String], limit: i64) -> Result<Vec<Mission>, StoreError> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=tags.len()).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ");
        let tag_count_param = tags.len() + 1;
        let limit_param = tags.len() + 2;

        let sql = format!(
            "SELECT mission.id, mission.content, mission.create_time, mission.last_update_time
             FROM mission
             JOIN missiontag ON missiontag.mission_id = mission.id
             WHERE missiontag.tag_name IN ({placeholders})
             GROUP BY mission.id
             HAVING COUNT(DISTINCT missiontag.tag_name) = ?{tag_count_param}
             AND NOT EXISTS (
                 SELECT 1 FROM attempt
                 WHERE attempt.mission_id = mission.id
                 AND (
                     attempt.success = 1
                     OR (julianday('now') - julianday(attempt.last_update_time)) * 86400000.0
                         <= attempt.max_time_interval_ms
                 )
             )
             ORDER BY mission.create_time ASC
             LIMIT ?{limit_param}"
        );

        let mut values: Vec<Value> = tags.iter().map(|t| Value::from(t.clone())).collect();
        values.push(Value::from(tags.len() as i64));
        values.push(Value::from(limit));

        let mut rows = self.connection.query(&sql, params_from_iter(values)).await?;
        let mut missions = Vec::new();
        while let Some(row) = rows.next().await? {
            missions.push(mission_from_row(&row)?);
        }
        Ok(missions)
    }
}
