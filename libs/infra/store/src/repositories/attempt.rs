// [libs/infra/store/src/repositories/attempt.rs]
//! Attempt lifecycle: claiming a mission, heartbeating it while a handler
//! runs, and marking it finished.

use libsql::{params, Connection};
use missionpanel_models::{Attempt, Mission};
use tracing::{info, instrument};

use crate::errors::StoreError;
use crate::mapping::{attempt_from_row, now_rfc3339};
use crate::repositories::claim::ClaimQuery;
use crate::repositories::tx::in_immediate_transaction;

#[derive(Clone)]
pub struct AttemptRepository {
    connection: Connection,
}

impl AttemptRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Finds one eligible Mission for `tags` and inserts its Attempt in the
    /// same `BEGIN IMMEDIATE` transaction, so no other handler — in this
    /// process or another — can observe the Mission as still unclaimed
    /// between the check and the insert. Picks the oldest eligible mission;
    /// callers that need a pluggable selection policy over several
    /// candidates should use `claim_specific` instead.
    #[instrument(skip(self))]
    pub async fn claim_one(
        &self,
        tags: &[String],
        handler: &str,
        max_time_interval_ms: i64,
    ) -> Result<Option<(Mission, Attempt)>, StoreError> {
        let connection = self.connection.clone();
        let handler = handler.to_string();
        let tags = tags.to_vec();

        in_immediate_transaction(&connection, move |connection| {
            let handler = handler.clone();
            let tags = tags.clone();
            async move {
                let claim_query = ClaimQuery::new(connection.clone());
                let mut candidates = claim_query.todo_missions(&tags, 1).await?;
                let Some(mission) = candidates.pop() else {
                    return Ok(None);
                };

                let attempt = insert_attempt(connection, &mission, &handler, max_time_interval_ms).await?;
                Ok(Some((mission, attempt)))
            }
        })
        .await
        .inspect(|claimed| {
            if let Some((mission, attempt)) = claimed {
                info!(mission_id = mission.id, attempt_id = attempt.id, "mission claimed");
            }
        })
    }

    /// Claims a specific, caller-chosen Mission, rechecking its eligibility
    /// inside the same `BEGIN IMMEDIATE` transaction as the insert. This is
    /// how a handler's `select_mission` policy hook gets to pick among
    /// several eligible candidates without losing the atomicity of the
    /// claim: the candidates are read outside any lock, the pick is made in
    /// user code, and only the single chosen mission is re-validated and
    /// claimed here. Returns `Ok(None)` if another handler claimed it first.
    #[instrument(skip(self))]
    pub async fn claim_specific(
        &self,
        mission_id: i64,
        handler: &str,
        max_time_interval_ms: i64,
    ) -> Result<Option<Attempt>, StoreError> {
        let connection = self.connection.clone();
        let handler = handler.to_string();

        in_immediate_transaction(&connection, move |connection| {
            let handler = handler.clone();
            async move {
                let mut rows = connection
                    .query(
                        "SELECT id, content, create_time, last_update_time FROM mission
                         WHERE id = ?1
                         AND NOT EXISTS (
                             SELECT 1 FROM attempt
                             WHERE attempt.mission_id = mission.id
                             AND (
                                 attempt.success = 1
                                 OR (julianday('now') - julianday(attempt.last_update_time)) * 86400000.0
                                     <= attempt.max_time_interval_ms
                             )
                         )",
                        params![mission_id],
                    )
                    .await?;

                let Some(row) = rows.next().await? else {
                    return Ok(None);
                };
                let mission = crate::mapping::mission_from_row(&row)?;

                let attempt = insert_attempt(connection, &mission, &handler, max_time_interval_ms).await?;
                Ok(Some(attempt))
            }
        })
        .await
        .inspect(|claimed| {
            if let Some(attempt) = claimed {
                info!(mission_id, attempt_id = attempt.id, "mission claimed");
            }
        })
    }

    /// Refreshes `last_update_time` so the watchdog knows the handler is
    /// still alive. Called on a cadence of `max_time_interval_ms / 2`.
    #[instrument(skip(self))]
    pub async fn heartbeat(&self, attempt_id: i64) -> Result<(), StoreError> {
        let now = now_rfc3339();
        let changed = self
            .connection
            .execute(
                "UPDATE attempt SET last_update_time = ?1 WHERE id = ?2 AND success = 0",
                params![now, attempt_id],
            )
            .await?;

        if changed == 0 {
            return Err(StoreError::InvalidAttemptState);
        }
        Ok(())
    }

    /// Marks the Attempt finished and stamps a final heartbeat. `success`
    /// reflects whatever the handler's `execute_mission` returned.
    #[instrument(skip(self))]
    pub async fn complete(&self, attempt_id: i64, success: bool) -> Result<(), StoreError> {
        let now = now_rfc3339();
        let changed = self
            .connection
            .execute(
                "UPDATE attempt SET success = ?1, last_update_time = ?2 WHERE id = ?3",
                params![success as i64, now, attempt_id],
            )
            .await?;

        if changed == 0 {
            return Err(StoreError::InvalidAttemptState);
        }
        Ok(())
    }
}

async fn insert_attempt(
    connection: &Connection,
    mission: &Mission,
    handler: &str,
    max_time_interval_ms: i64,
) -> Result<Attempt, StoreError> {
    let now = now_rfc3339();
    connection
        .execute(
            "INSERT INTO attempt
                (handler, mission_id, create_time, last_update_time, max_time_interval_ms, content, success)
             VALUES (?1, ?2, ?3, ?3, ?4, ?5, 0)",
            params![handler.to_string(), mission.id, now, max_time_interval_ms, mission.content.to_string()],
        )
        .await?;
    let attempt_id = connection.last_insert_rowid();
    fetch(connection, attempt_id).await
}

async fn fetch(connection: &Connection, attempt_id: i64) -> Result<Attempt, StoreError> {
    let mut rows = connection
        .query(
            "SELECT id, handler, mission_id, create_time, last_update_time, max_time_interval_ms, content, success
             FROM attempt WHERE id = ?1",
            params![attempt_id],
        )
        .await?;

    let row = rows.next().await?.ok_or(StoreError::InvalidAttemptState)?;
    attempt_from_row(&row)
}
