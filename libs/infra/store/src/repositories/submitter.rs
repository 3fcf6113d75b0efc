// [libs/infra/store/src/repositories/submitter.rs]
//! Submission-side operations: `match_mission`, `create_mission`, `add_tags`.
//!
//! All three run inside a `BEGIN IMMEDIATE` transaction (see `tx.rs`) so
//! that two submitters racing on overlapping patterns never both believe
//! they created a fresh Mission.

use libsql::{params, params_from_iter, Connection, Value};
use missionpanel_models::Mission;
use tracing::{info, instrument};

use crate::errors::StoreError;
use crate::mapping::{mission_from_row, now_rfc3339};
use crate::repositories::tx::in_immediate_transaction;

/// Looks up the Mission addressed by any of `patterns`, without locking.
/// The first step inside every submission operation's immediate
/// transaction — `match_mission`, `create_mission`, and `add_tags` all
/// start here before doing their own read-then-write.
async fn find_by_patterns(connection: &Connection, patterns: &[String]) -> Result<Option<Mission>, StoreError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let placeholders = (1..=patterns.len()).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ");
    let sql = format!(
        "SELECT mission.id, mission.content, mission.create_time, mission.last_update_time
         FROM mission
         JOIN matcher ON matcher.mission_id = mission.id
         WHERE matcher.pattern IN ({placeholders})
         LIMIT 1"
    );

    let values: Vec<Value> = patterns.iter().map(|p| Value::from(p.clone())).collect();
    let mut rows = connection.query(&sql, params_from_iter(values)).await?;

    match rows.next().await? {
        Some(row) => Ok(Some(mission_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Inserts matcher rows for any `patterns` not already registered against
/// `mission_id`. Patterns are globally unique, so this can only add rows
/// that don't exist yet for *any* mission — the caller already confirmed
/// none of `patterns` resolved elsewhere before calling this.
async fn union_patterns(connection: &Connection, mission_id: i64, patterns: &[String]) -> Result<(), StoreError> {
    for pattern in patterns {
        connection
            .execute(
                "INSERT OR IGNORE INTO matcher (pattern, mission_id) VALUES (?1, ?2)",
                params![pattern.clone(), mission_id],
            )
            .await?;
    }
    Ok(())
}

async fn add_tags_locked(connection: &Connection, mission_id: i64, tags: &[String]) -> Result<(), StoreError> {
    for tag in tags {
        connection
            .execute("INSERT OR IGNORE INTO tag (name) VALUES (?1)", params![tag.clone()])
            .await?;
        connection
            .execute(
                "INSERT OR IGNORE INTO missiontag (tag_name, mission_id) VALUES (?1, ?2)",
                params![tag.clone(), mission_id],
            )
            .await?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct SubmitterRepository {
    connection: Connection,
}

impl SubmitterRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Resolves `patterns` to a Mission, if any of them is already
    /// registered, and extends that Mission's matcher set with whichever of
    /// `patterns` it doesn't yet carry. Submitters use this to both probe
    /// for an existing unit of work and register a new alias for it in one
    /// call, matching the original submitter's `match_mission` (which
    /// unions new matchers unconditionally and commits).
    #[instrument(skip(self))]
    pub async fn match_mission(&self, patterns: &[String]) -> Result<Option<Mission>, StoreError> {
        if patterns.is_empty() {
            return Ok(None);
        }

        let connection = self.connection.clone();

        in_immediate_transaction(&connection, move |connection| {
            let patterns = patterns.to_vec();
            async move {
                let Some(mission) = find_by_patterns(connection, &patterns).await? else {
                    return Ok(None);
                };
                union_patterns(connection, mission.id, &patterns).await?;
                refetch(connection, mission.id).await.map(Some)
            }
        })
        .await
    }

    /// Idempotent submission: if `patterns` already resolve to a Mission,
    /// its content is overwritten with `content` when it differs (last
    /// writer wins) and any new patterns are unioned in; otherwise a fresh
    /// Mission is created. `tags`, if given, are attached either way.
    #[instrument(skip(self, content))]
    pub async fn create_mission(
        &self,
        content: serde_json::Value,
        patterns: &[String],
        tags: &[String],
    ) -> Result<Mission, StoreError> {
        let connection = self.connection.clone();
        let content_json = content.to_string();

        in_immediate_transaction(&connection, move |connection| {
            let patterns = patterns.to_vec();
            let tags = tags.to_vec();
            let content_json = content_json.clone();
            async move {
                let existing = find_by_patterns(connection, &patterns).await?;

                let mission = match existing {
                    Some(mission) => {
                        if mission.content.to_string() != content_json {
                            let now = now_rfc3339();
                            connection
                                .execute(
                                    "UPDATE mission SET content = ?1, last_update_time = ?2 WHERE id = ?3",
                                    params![content_json.clone(), now, mission.id],
                                )
                                .await?;
                        }
                        // Unioned unconditionally: a resubmission with unchanged
                        // content but a new pattern must still register that
                        // pattern against the existing mission.
                        union_patterns(connection, mission.id, &patterns).await?;
                        refetch(connection, mission.id).await?
                    }
                    None => {
                        let now = now_rfc3339();
                        connection
                            .execute(
                                "INSERT INTO mission (content, create_time, last_update_time) VALUES (?1, ?2, ?2)",
                                params![content_json.clone(), now],
                            )
                            .await?;
                        let mission_id = connection.last_insert_rowid();
                        union_patterns(connection, mission_id, &patterns).await?;
                        refetch(connection, mission_id).await?
                    }
                };

                if !tags.is_empty() {
                    add_tags_locked(connection, mission.id, &tags).await?;
                }

                Ok(mission)
            }
        })
        .await
        .inspect(|mission| info!(mission_id = mission.id, "mission submitted"))
    }

    /// Attaches `tags` to the Mission addressed by `patterns`. Errors with
    /// `MissionNotFound` if no mission resolves — callers are expected to
    /// `create_mission` first.
    #[instrument(skip(self))]
    pub async fn add_tags(&self, patterns: &[String], tags: &[String]) -> Result<Mission, StoreError> {
        let connection = self.connection.clone();

        in_immediate_transaction(&connection, move |connection| {
            let patterns = patterns.to_vec();
            let tags = tags.to_vec();
            async move {
                let mission = find_by_patterns(connection, &patterns).await?.ok_or(StoreError::MissionNotFound)?;
                add_tags_locked(connection, mission.id, &tags).await?;
                Ok(mission)
            }
        })
        .await
    }
}

async fn refetch(connection: &Connection, mission_id: i64) -> Result<Mission, StoreError> {
    let mut rows = connection
        .query(
            "SELECT id, content, create_time, last_update_time FROM mission WHERE id = ?1",
            params![mission_id],
        )
        .await?;

    let row = rows.next().await?.ok_or(StoreError::MissionNotFound)?;
    mission_from_row(&row)
}
