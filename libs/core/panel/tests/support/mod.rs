// [libs/core/panel/tests/support/mod.rs]
//! An in-memory `MissionStore` fake mirroring the SQL store's observable
//! semantics, so the runtime can be tested without a libSQL connection.

use std::collections::HashMap;
use std::sync::Mutex as StdMutex;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use missionpanel_models::{Attempt, Mission};
use missionpanel_store::{MissionStore, StoreError};

#[derive(Default)]
struct Inner {
    next_mission_id: i64,
    next_attempt_id: i64,
    missions: HashMap<i64, Mission>,
    tags: HashMap<i64, Vec<String>>,
    attempts: Vec<Attempt>,
}

pub struct MockStore {
    inner: StdMutex<Inner>,
}

fn now_ms() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis() as i64
}

impl MockStore {
    pub fn new() -> Self {
        Self { inner: StdMutex::new(Inner::default()) }
    }

    pub fn seed_mission(&self, content: serde_json::Value, tags: &[&str]) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        inner.next_mission_id += 1;
        let id = inner.next_mission_id;
        let now = chrono::Utc::now();
        inner.missions.insert(id, Mission { id, content, create_time: now, last_update_time: now });
        inner.tags.insert(id, tags.iter().map(|t| t.to_string()).collect());
        id
    }

    fn is_eligible(inner: &Inner, mission_id: i64) -> bool {
        !inner.attempts.iter().any(|a| {
            a.mission_id == mission_id && (a.success || now_ms() - a.last_update_time.timestamp_millis() <= a.max_time_interval_ms)
        })
    }
}

#[async_trait]
impl MissionStore for MockStore {
    async fn match_mission(&self, _patterns: &[String]) -> Result<Option<Mission>, StoreError> {
        Ok(None)
    }

    async fn create_mission(
        &self,
        _content: serde_json::Value,
        _patterns: &[String],
        _tags: &[String],
    ) -> Result<Mission, StoreError> {
        Err(StoreError::MissionNotFound)
    }

    async fn add_tags(&self, _patterns: &[String], _tags: &[String]) -> Result<Mission, StoreError> {
        Err(StoreError::MissionNotFound)
    }

    async fn todo_missions(&self, tags: &[String], limit: i64) -> Result<Vec<Mission>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut matches: Vec<Mission> = inner
            .missions
            .values()
            .filter(|m| {
                let mission_tags = inner.tags.get(&m.id).cloned().unwrap_or_default();
                tags.iter().all(|t| mission_tags.contains(t)) && Self::is_eligible(&inner, m.id)
            })
            .cloned()
            .collect();
        matches.sort_by_key(|m| m.id);
        matches.truncate(limit.max(0) as usize);
        Ok(matches)
    }

    async fn claim_eligible(
        &self,
        tags: &[String],
        handler: &str,
        max_time_interval_ms: i64,
    ) -> Result<Option<(Mission, Attempt)>, StoreError> {
        let candidate = self.todo_missions(tags, 1).await?.into_iter().next();
        let Some(mission) = candidate else { return Ok(None) };
        let attempt = self.claim_specific(mission.id, handler, max_time_interval_ms).await?;
        Ok(attempt.map(|a| (mission, a)))
    }

    async fn claim_specific(
        &self,
        mission_id: i64,
        handler: &str,
        max_time_interval_ms: i64,
    ) -> Result<Option<Attempt>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !Self::is_eligible(&inner, mission_id) {
            return Ok(None);
        }
        let content = inner.missions.get(&mission_id).map(|m| m.content.clone()).unwrap_or_default();
        inner.next_attempt_id += 1;
        let id = inner.next_attempt_id;
        let now = chrono::Utc::now();
        let attempt = Attempt {
            id,
            handler: handler.to_string(),
            mission_id,
            create_time: now,
            last_update_time: now,
            max_time_interval_ms,
            content,
            success: false,
        };
        inner.attempts.push(attempt.clone());
        Ok(Some(attempt))
    }

    async fn heartbeat_attempt(&self, attempt_id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let attempt = inner.attempts.iter_mut().find(|a| a.id == attempt_id).ok_or(StoreError::InvalidAttemptState)?;
        attempt.last_update_time = chrono::Utc::now();
        Ok(())
    }

    async fn complete_attempt(&self, attempt_id: i64, success: bool) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let attempt = inner.attempts.iter_mut().find(|a| a.id == attempt_id).ok_or(StoreError::InvalidAttemptState)?;
        attempt.success = success;
        attempt.last_update_time = chrono::Utc::now();
        Ok(())
    }
}
