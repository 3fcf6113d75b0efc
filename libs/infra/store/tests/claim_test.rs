// [libs/infra/store/tests/claim_test.rs]
use missionpanel_store::repositories::{AttemptRepository, SubmitterRepository};
use missionpanel_store::StoreClient;
use serde_json::json;
use std::time::Duration;

async fn memory_client(name: &str) -> StoreClient {
    let url = format!("file:{name}?mode=memory&cache=shared");
    StoreClient::connect(&url, None).await.expect("in-memory store should connect")
}

#[tokio::test]
async fn claim_requires_every_tag_to_match() {
    let client = memory_client("claim_all_of").await;
    let submitter = SubmitterRepository::new(client.connection().await.unwrap());
    let attempts = AttemptRepository::new(client.connection().await.unwrap());

    let partial = submitter.create_mission(json!({}), &["u:1".into()], &["tag:a".into()]).await.unwrap();
    let full = submitter
        .create_mission(json!({}), &["u:2".into()], &["tag:a".into(), "tag:b".into()])
        .await
        .unwrap();

    let claimed = attempts.claim_one(&["tag:a".into(), "tag:b".into()], "h1", 60_000).await.unwrap();

    let (mission, _attempt) = claimed.expect("a mission carrying both tags should be claimable");
    assert_eq!(mission.id, full.id);
    assert_ne!(mission.id, partial.id);
}

#[tokio::test]
async fn a_claimed_mission_is_not_claimable_again_while_its_attempt_is_live() {
    let client = memory_client("claim_exclusion").await;
    let submitter = SubmitterRepository::new(client.connection().await.unwrap());
    let attempts = AttemptRepository::new(client.connection().await.unwrap());

    submitter.create_mission(json!({}), &["u:3".into()], &["tag:x".into()]).await.unwrap();

    let first = attempts.claim_one(&["tag:x".into()], "h1", 60_000).await.unwrap();
    assert!(first.is_some());

    let second = attempts.claim_one(&["tag:x".into()], "h2", 60_000).await.unwrap();
    assert!(second.is_none(), "a live attempt must block a second claim");
}

#[tokio::test]
async fn a_mission_is_reclaimable_once_its_attempt_goes_stale() {
    let client = memory_client("claim_reclaim").await;
    let submitter = SubmitterRepository::new(client.connection().await.unwrap());
    let attempts = AttemptRepository::new(client.connection().await.unwrap());

    submitter.create_mission(json!({}), &["u:4".into()], &["tag:y".into()]).await.unwrap();

    // A 1ms heartbeat window goes stale almost immediately without a
    // heartbeat, simulating a handler that crashed mid-run.
    let (mission, _attempt) = attempts.claim_one(&["tag:y".into()], "h1", 1).await.unwrap().unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;

    let reclaimed = attempts.claim_one(&["tag:y".into()], "h2", 60_000).await.unwrap();
    let (reclaimed_mission, _) = reclaimed.expect("a stale attempt must not block reclamation");
    assert_eq!(reclaimed_mission.id, mission.id);
}

#[tokio::test]
async fn a_completed_mission_stays_claimed_forever() {
    let client = memory_client("claim_completed").await;
    let submitter = SubmitterRepository::new(client.connection().await.unwrap());
    let attempts = AttemptRepository::new(client.connection().await.unwrap());

    submitter.create_mission(json!({}), &["u:5".into()], &["tag:z".into()]).await.unwrap();

    let (_mission, attempt) = attempts.claim_one(&["tag:z".into()], "h1", 60_000).await.unwrap().unwrap();
    attempts.complete(attempt.id, true).await.unwrap();

    let claimed_again = attempts.claim_one(&["tag:z".into()], "h2", 60_000).await.unwrap();
    assert!(claimed_again.is_none(), "a successful attempt must never be reopened");
}

#[tokio::test]
async fn claim_specific_loses_the_race_gracefully() {
    let client = memory_client("claim_specific_race").await;
    let submitter = SubmitterRepository::new(client.connection().await.unwrap());
    let attempts = AttemptRepository::new(client.connection().await.unwrap());

    let mission = submitter.create_mission(json!({}), &["u:6".into()], &["tag:w".into()]).await.unwrap();

    // h1 claims it via the default path...
    attempts.claim_one(&["tag:w".into()], "h1", 60_000).await.unwrap().unwrap();

    // ...so h2, working off a stale candidate list, must lose the race.
    let lost_race = attempts.claim_specific(mission.id, "h2", 60_000).await.unwrap();
    assert!(lost_race.is_none());
}

#[tokio::test]
async fn heartbeat_on_an_unknown_attempt_fails() {
    let client = memory_client("claim_heartbeat_unknown").await;
    let attempts = AttemptRepository::new(client.connection().await.unwrap());

    let result = attempts.heartbeat(999).await;
    assert!(result.is_err());
}
