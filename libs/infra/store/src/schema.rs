// [libs/infra/store/src/schema.rs]
/*!
 * Mission panel storage schema (SQLite / libSQL dialect).
 *
 * Four entities plus Attempt, matching the schema in the panel
 * specification exactly. SQLite has no native `INTERVAL` type, so
 * `attempt.max_time_interval_ms` stores the heartbeat threshold as a
 * millisecond count; timestamps are stored as RFC 3339 text so SQLite's
 * `julianday()` can operate on them directly inside the claim query.
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument};

const TABLES: &[(&str, &str)] = &[
    (
        "mission",
        r#"
        CREATE TABLE IF NOT EXISTS mission (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL DEFAULT '{}',
            create_time TEXT NOT NULL,
            last_update_time TEXT NOT NULL
        );
    "#,
    ),
    (
        "matcher",
        r#"
        CREATE TABLE IF NOT EXISTS matcher (
            pattern TEXT PRIMARY KEY,
            mission_id INTEGER NOT NULL REFERENCES mission(id)
        );
    "#,
    ),
    (
        "tag",
        r#"
        CREATE TABLE IF NOT EXISTS tag (
            name TEXT PRIMARY KEY
        );
    "#,
    ),
    (
        "missiontag",
        r#"
        CREATE TABLE IF NOT EXISTS missiontag (
            tag_name TEXT NOT NULL REFERENCES tag(name),
            mission_id INTEGER NOT NULL REFERENCES mission(id),
            PRIMARY KEY (tag_name, mission_id)
        );
    "#,
    ),
    (
        "attempt",
        r#"
        CREATE TABLE IF NOT EXISTS attempt (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            handler TEXT NOT NULL,
            mission_id INTEGER NOT NULL REFERENCES mission(id),
            create_time TEXT NOT NULL,
            last_update_time TEXT NOT NULL,
            max_time_interval_ms INTEGER NOT NULL,
            content TEXT NOT NULL DEFAULT '{}',
            success INTEGER NOT NULL DEFAULT 0
        );
    "#,
    ),
];

const INDEXES: &[(&str, &str)] = &[
    (
        "idx_matcher_mission",
        "CREATE INDEX IF NOT EXISTS idx_matcher_mission ON matcher(mission_id);",
    ),
    (
        "idx_missiontag_mission",
        "CREATE INDEX IF NOT EXISTS idx_missiontag_mission ON missiontag(mission_id);",
    ),
    (
        "idx_attempt_mission",
        "CREATE INDEX IF NOT EXISTS idx_attempt_mission ON attempt(mission_id);",
    ),
    (
        "idx_attempt_liveness",
        "CREATE INDEX IF NOT EXISTS idx_attempt_liveness ON attempt(mission_id, success, last_update_time);",
    ),
];

/// Creates every table and index if it doesn't already exist.
///
/// # Errors
/// Returns an error if any `CREATE TABLE`/`CREATE INDEX` statement is
/// rejected by the connection — a sign the underlying file is not a usable
/// SQLite database.
#[instrument(skip(connection))]
pub async fn apply(connection: &Connection) -> Result<()> {
    solidify_tables(connection).await?;
    harden_indexes(connection).await?;
    info!("mission panel schema synchronized");
    Ok(())
}

async fn solidify_tables(connection: &Connection) -> Result<()> {
    for (name, sql) in TABLES {
        connection
            .execute(sql, ())
            .await
            .with_context(|| format!("failed to create table {name}"))?;
        debug!(table = name, "table solidified");
    }
    Ok(())
}

async fn harden_indexes(connection: &Connection) -> Result<()> {
    for (name, sql) in INDEXES {
        connection
            .execute(sql, ())
            .await
            .with_context(|| format!("failed to create index {name}"))?;
    }
    Ok(())
}
