//! End-to-end engine scenarios across process restarts.

use rotabot::config::RotaConfig;
use rotabot::rotation::engine::{Audience, RotationEngine};
use rotabot::rotation::model::{Participant, ParticipantId};
use rotabot::store::SnapshotStore;
use tempfile::TempDir;

const SUPERVISOR: i64 = 777;

fn p(id: i64, name: &str) -> Participant {
    Participant::new(ParticipantId::Telegram(id), name)
}

fn supervisor() -> ParticipantId {
    ParticipantId::Telegram(SUPERVISOR)
}

fn config(dir: &TempDir) -> RotaConfig {
    RotaConfig {
        categories: vec!["Trash".to_string(), "Dishes".to_string()],
        supervisor_id: SUPERVISOR,
        snapshot_path: dir.path().join("state.json"),
        ..RotaConfig::default()
    }
}

async fn load(config: &RotaConfig) -> RotationEngine {
    let store = SnapshotStore::new(config.snapshot_path.clone());
    RotationEngine::load(config.clone(), store).await
}

#[tokio::test]
async fn rotation_cycle_with_approval() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let mut engine = load(&config).await;

    for (id, name) in [(1, "a"), (2, "b"), (3, "c")] {
        engine.on_join_request("Trash", &p(id, name)).await.unwrap();
    }

    // One full cycle: each member claims, the supervisor confirms
    for claimant in [p(1, "a"), p(2, "b"), p(3, "c")] {
        engine
            .on_completion_claim("Trash", &claimant)
            .await
            .unwrap();
        engine
            .on_supervisor_approve("Trash", &supervisor())
            .await
            .unwrap();
    }

    // Back to the original order
    let status = engine.on_status_query();
    assert!(status.notifications[0].text.contains("*a* → b → c"));
}

#[tokio::test]
async fn pending_claim_survives_restart() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    {
        let mut engine = load(&config).await;
        engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
        engine.on_join_request("Trash", &p(2, "b")).await.unwrap();
        engine.on_completion_claim("Trash", &p(1, "a")).await.unwrap();
        // Engine dropped here, as in a process crash after the save
    }

    let mut engine = load(&config).await;
    let reply = engine
        .on_supervisor_approve("Trash", &supervisor())
        .await
        .unwrap();
    assert!(reply.notifications.iter().any(
        |n| n.audience == Audience::Participant(ParticipantId::Telegram(2))
    ));

    let status = engine.on_status_query();
    assert!(status.notifications[0].text.contains("*b*"));
}

#[tokio::test]
async fn categories_rotate_independently() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let mut engine = load(&config).await;

    engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
    engine.on_join_request("Trash", &p(2, "b")).await.unwrap();
    engine.on_join_request("Dishes", &p(1, "a")).await.unwrap();
    engine.on_join_request("Dishes", &p(2, "b")).await.unwrap();

    engine.on_completion_claim("Trash", &p(1, "a")).await.unwrap();
    engine
        .on_supervisor_approve("Trash", &supervisor())
        .await
        .unwrap();

    let status = engine.on_status_query();
    let text = &status.notifications[0].text;
    assert!(text.contains("Trash: *b* → a"));
    assert!(text.contains("Dishes: *a* → b"));
}

#[tokio::test]
async fn placeholder_participants_persist_and_rotate() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    {
        let mut engine = load(&config).await;
        engine
            .on_supervisor_add_participant("Trash", &supervisor(), "guest1")
            .await
            .unwrap();
        engine
            .on_supervisor_add_participant("Trash", &supervisor(), "guest2")
            .await
            .unwrap();
    }

    let mut engine = load(&config).await;
    let status = engine.on_status_query();
    assert!(status.notifications[0].text.contains("*guest1* → guest2"));

    engine
        .on_supervisor_remove_participant("Trash", &supervisor(), "guest1")
        .await
        .unwrap();
    let status = engine.on_status_query();
    assert!(status.notifications[0].text.contains("*guest2*"));
}

#[tokio::test]
async fn snapshot_file_is_the_documented_wire_format() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let mut engine = load(&config).await;
    engine.on_join_request("Trash", &p(5, "eve")).await.unwrap();
    engine.on_completion_claim("Trash", &p(5, "eve")).await.unwrap();

    let raw = tokio::fs::read_to_string(&config.snapshot_path).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["queues"]["Trash"][0]["id"], 5);
    assert_eq!(json["queues"]["Trash"][0]["username"], "eve");
    assert_eq!(json["membership"]["5"]["Trash"], true);
    assert_eq!(json["pending"]["Trash"]["id"], 5);
}

#[tokio::test]
async fn hand_corrupted_snapshot_does_not_prevent_startup() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    tokio::fs::create_dir_all(dir.path()).await.unwrap();
    tokio::fs::write(&config.snapshot_path, "}}}garbage{{{")
        .await
        .unwrap();

    let mut engine = load(&config).await;
    // Starts empty and fully usable
    engine.on_join_request("Trash", &p(1, "a")).await.unwrap();
    let status = engine.on_status_query();
    assert!(status.notifications[0].text.contains("*a*"));
}
