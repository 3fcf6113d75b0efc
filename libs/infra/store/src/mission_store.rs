// [libs/infra/store/src/mission_store.rs]
//! The `MissionStore` trait boundary: everything `missionpanel-core` needs
//! from persistence, with no SQL or libSQL types crossing it. `LibsqlStore`
//! is the only implementation shipped, but the protocol logic never depends
//! on it directly.

use async_trait::async_trait;
use missionpanel_models::{Attempt, Mission};

use crate::client::StoreClient;
use crate::errors::StoreError;
use crate::repositories::{AttemptRepository, ClaimQuery, SubmitterRepository};

#[async_trait]
pub trait MissionStore: Send + Sync {
    async fn match_mission(&self, patterns: &[String]) -> Result<Option<Mission>, StoreError>;

    async fn create_mission(
        &self,
        content: serde_json::Value,
        patterns: &[String],
        tags: &[String],
    ) -> Result<Mission, StoreError>;

    async fn add_tags(&self, patterns: &[String], tags: &[String]) -> Result<Mission, StoreError>;

    /// Read-only list of missions eligible for `tags`, oldest first. Used by
    /// the handler runtime to materialize candidates before running a
    /// caller-supplied `select_mission` policy.
    async fn todo_missions(&self, tags: &[String], limit: i64) -> Result<Vec<Mission>, StoreError>;

    /// Atomically claims one eligible mission, picking the oldest. Used by
    /// the default single-candidate path.
    async fn claim_eligible(
        &self,
        tags: &[String],
        handler: &str,
        max_time_interval_ms: i64,
    ) -> Result<Option<(Mission, Attempt)>, StoreError>;

    /// Re-checks and claims a specific mission a `select_mission` policy
    /// already picked out of a `todo_missions` candidate list. Returns
    /// `Ok(None)` if another handler claimed it in the meantime.
    async fn claim_specific(
        &self,
        mission_id: i64,
        handler: &str,
        max_time_interval_ms: i64,
    ) -> Result<Option<Attempt>, StoreError>;

    async fn heartbeat_attempt(&self, attempt_id: i64) -> Result<(), StoreError>;

    async fn complete_attempt(&self, attempt_id: i64, success: bool) -> Result<(), StoreError>;
}

/// The libSQL-backed `MissionStore`. Holds one connection per repository;
/// libSQL connections are cheap handles onto a shared driver, not sockets,
/// so this isn't pooling overhead.
pub struct LibsqlStore {
    submitter: SubmitterRepository,
    claim: ClaimQuery,
    attempts: AttemptRepository,
}

impl LibsqlStore {
    pub async fn new(client: &StoreClient) -> Result<Self, StoreError> {
        Ok(Self {
            submitter: SubmitterRepository::new(client.connection().await?),
            claim: ClaimQuery::new(client.connection().await?),
            attempts: AttemptRepository::new(client.connection().await?),
        })
    }
}

#[async_trait]
impl MissionStore for LibsqlStore {
    async fn match_mission(&self, patterns: &[String]) -> Result<Option<Mission>, StoreError> {
        self.submitter.match_mission(patterns).await
    }

    async fn create_mission(
        &self,
        content: serde_json::Value,
        patterns: &[String],
        tags: &[String],
    ) -> Result<Mission, StoreError> {
        self.submitter.create_mission(content, patterns, tags).await
    }

    async fn add_tags(&self, patterns: &[String], tags: &[String]) -> Result<Mission, StoreError> {
        self.submitter.add_tags(patterns, tags).await
    }

    async fn todo_missions(&self, tags: &[String], limit: i64) -> Result<Vec<Mission>, StoreError> {
        self.claim.todo_missions(tags, limit).await
    }

    async fn claim_eligible(
        &self,
        tags: &[String],
        handler: &str,
        max_time_interval_ms: i64,
    ) -> Result<Option<(Mission, Attempt)>, StoreError> {
        self.attempts.claim_one(tags, handler, max_time_interval_ms).await
    }

    async fn claim_specific(
        &self,
        mission_id: i64,
        handler: &str,
        max_time_interval_ms: i64,
    ) -> Result<Option<Attempt>, StoreError> {
        self.attempts.claim_specific(mission_id, handler, max_time_interval_ms).await
    }

    async fn heartbeat_attempt(&self, attempt_id: i64) -> Result<(), StoreError> {
        self.attempts.heartbeat(attempt_id).await
    }

    async fn complete_attempt(&self, attempt_id: i64, success: bool) -> Result<(), StoreError> {
        self.attempts.complete(attempt_id, success).await
    }
}
