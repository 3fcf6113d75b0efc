// [libs/infra/store/src/mapping.rs]
//! Row <-> domain type conversions shared by every repository. Timestamps
//! are stored as RFC 3339 text (see schema.rs); `content` columns are
//! stored as serialized JSON text.

use chrono::{DateTime, Utc};
use libsql::Row;
use missionpanel_models::{Attempt, Mission};

use crate::errors::StoreError;

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Mapping(format!("bad timestamp '{raw}': {e}")))
}

pub fn parse_content(raw: &str) -> Result<serde_json::Value, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Mapping(format!("bad content json: {e}")))
}

pub fn mission_from_row(row: &Row) -> Result<Mission, StoreError> {
    let id: i64 = row.get(0)?;
    let content: String = row.get(1)?;
    let create_time: String = row.get(2)?;
    let last_update_time: String = row.get(3)?;

    Ok(Mission {
        id,
        content: parse_content(&content)?,
        create_time: parse_timestamp(&create_time)?,
        last_update_time: parse_timestamp(&last_update_time)?,
    })
}

pub fn attempt_from_row(row: &Row) -> Result<Attempt, StoreError> {
    let id: i64 = row.get(0)?;
    let handler: String = row.get(1)?;
    let mission_id: i64 = row.get(2)?;
    let create_time: String = row.get(3)?;
    let last_update_time: String = row.get(4)?;
    let max_time_interval_ms: i64 = row.get(5)?;
    let content: String = row.get(6)?;
    let success: i64 = row.get(7)?;

    Ok(Attempt {
        id,
        handler,
        mission_id,
        create_time: parse_timestamp(&create_time)?,
        last_update_time: parse_timestamp(&last_update_time)?,
        max_time_interval_ms,
        content: parse_content(&content)?,
        success: success != 0,
    })
}
