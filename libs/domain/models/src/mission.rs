// [libs/domain/models/src/mission.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dense integer identifier assigned by the store on insert.
pub type MissionId = i64;

/// A unit of work. `content` is an opaque, submitter-defined JSON document;
/// the protocol core never inspects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mission {
    pub id: MissionId,
    pub content: serde_json::Value,
    pub create_time: DateTime<Utc>,
    pub last_update_time: DateTime<Utc>,
}

/// An external identifier that resolves into a [`Mission`]. `pattern` is
/// globally unique — two submitters racing to insert the same pattern
/// collide at the store, never silently duplicate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Matcher {
    pub pattern: String,
    pub mission_id: MissionId,
}
