// [libs/core/panel/tests/handler_test.rs]
mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use missionpanel_core::{Handler, HandlerRuntime};
use missionpanel_models::{Attempt, Mission};
use serde_json::json;
use support::MockStore;

struct CountingHandler {
    name: String,
    max_time_interval: Duration,
    calls: AtomicUsize,
    succeed: bool,
}

#[async_trait]
impl Handler for CountingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_time_interval(&self) -> Duration {
        self.max_time_interval
    }

    async fn execute_mission(&self, _mission: &Mission, _attempt: &Attempt) -> anyhow::Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.succeed)
    }
}

#[tokio::test]
async fn run_once_claims_and_executes_an_eligible_mission() {
    let store = Arc::new(MockStore::new());
    store.seed_mission(json!({"n": 1}), &["tag:a"]);

    let handler = Arc::new(CountingHandler {
        name: "h1".into(),
        max_time_interval: Duration::from_millis(200),
        calls: AtomicUsize::new(0),
        succeed: true,
    });

    let runtime = HandlerRuntime::new(store, handler.clone(), vec!["tag:a".into()]);
    let attempt = runtime.run_once().await.unwrap().expect("one eligible mission");

    assert!(attempt.success);
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn run_once_returns_none_when_nothing_is_eligible() {
    let store = Arc::new(MockStore::new());
    let handler = Arc::new(CountingHandler {
        name: "h1".into(),
        max_time_interval: Duration::from_millis(200),
        calls: AtomicUsize::new(0),
        succeed: true,
    });

    let runtime = HandlerRuntime::new(store, handler, vec!["tag:a".into()]);
    assert!(runtime.run_once().await.unwrap().is_none());
}

#[tokio::test]
async fn run_all_drains_every_eligible_mission() {
    let store = Arc::new(MockStore::new());
    for i in 0..3 {
        store.seed_mission(json!({"n": i}), &["tag:b"]);
    }

    let handler = Arc::new(CountingHandler {
        name: "h1".into(),
        max_time_interval: Duration::from_millis(200),
        calls: AtomicUsize::new(0),
        succeed: true,
    });

    let runtime = HandlerRuntime::new(store, handler.clone(), vec!["tag:b".into()]);
    let completed = runtime.run_all().await.unwrap();

    assert_eq!(completed, 3);
    assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn a_failed_execution_records_an_unsuccessful_attempt_without_propagating() {
    let store = Arc::new(MockStore::new());
    store.seed_mission(json!({}), &["tag:c"]);

    let handler = Arc::new(CountingHandler {
        name: "h1".into(),
        max_time_interval: Duration::from_millis(200),
        calls: AtomicUsize::new(0),
        succeed: false,
    });

    let runtime = HandlerRuntime::new(store, handler, vec!["tag:c".into()]);
    let attempt = runtime.run_once().await.unwrap().expect("mission was claimed");

    assert!(!attempt.success);
}

struct SlowHandler {
    name: String,
    max_time_interval: Duration,
    sleep_for: Duration,
}

#[async_trait]
impl Handler for SlowHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_time_interval(&self) -> Duration {
        self.max_time_interval
    }

    async fn execute_mission(&self, _mission: &Mission, _attempt: &Attempt) -> anyhow::Result<bool> {
        tokio::time::sleep(self.sleep_for).await;
        Ok(true)
    }
}

#[tokio::test]
async fn a_long_running_mission_is_heartbeated_while_it_runs() {
    let store = Arc::new(MockStore::new());
    store.seed_mission(json!({}), &["tag:d"]);

    // Heartbeat cadence is max_time_interval / 2 = 20ms; the mission takes
    // 90ms, so several heartbeats land before completion.
    let handler = Arc::new(SlowHandler {
        name: "h1".into(),
        max_time_interval: Duration::from_millis(40),
        sleep_for: Duration::from_millis(90),
    });

    let runtime = HandlerRuntime::new(Arc::clone(&store), handler, vec!["tag:d".into()]);
    let attempt = runtime.run_once().await.unwrap().expect("mission was claimed");

    assert!(attempt.success);
}
