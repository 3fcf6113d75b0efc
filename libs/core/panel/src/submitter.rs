// [libs/core/panel/src/submitter.rs]
//! Thin facade over `MissionStore` exposing exactly the submission surface
//! the panel specification names. No logic lives here beyond wiring —
//! the dedup/locking semantics are the store's.

use std::sync::Arc;

use missionpanel_models::Mission;
use missionpanel_store::MissionStore;
use tracing::instrument;

use crate::error::PanelError;

#[derive(Clone)]
pub struct Submitter {
    store: Arc<dyn MissionStore>,
}

impl Submitter {
    pub fn new(store: Arc<dyn MissionStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn match_mission(&self, patterns: &[String]) -> Result<Option<Mission>, PanelError> {
        Ok(self.store.match_mission(patterns).await?)
    }

    #[instrument(skip(self, content))]
    pub async fn create_mission(
        &self,
        content: serde_json::Value,
        patterns: &[String],
        tags: &[String],
    ) -> Result<Mission, PanelError> {
        Ok(self.store.create_mission(content, patterns, tags).await?)
    }

    #[instrument(skip(self))]
    pub async fn add_tags(&self, patterns: &[String], tags: &[String]) -> Result<Mission, PanelError> {
        Ok(self.store.add_tags(patterns, tags).await?)
    }
}
