// [libs/domain/models/src/tag.rs]
use serde::{Deserialize, Serialize};

use crate::mission::MissionId;

/// A routing label consumed by handlers. Created on first use, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tag {
    pub name: String,
}

/// The many-to-many join of Mission × Tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MissionTag {
    pub tag_name: String,
    pub mission_id: MissionId,
}
