use serde_json::json;
use tempfile::TempDir;

use briefloop::core::intake::{HitlStatus, WorkflowState};
use briefloop::error::SessionError;
use briefloop::session::{JsonFileSessionStore, SessionStore};

use crate::support::{ScriptedExtractor, batch, engine, incomplete_brief};

#[tokio::test]
async fn serialized_state_resumes_like_the_live_one() {
    let engine = engine(ScriptedExtractor::repeating(incomplete_brief()));
    let turn = engine.start_session("Bank spot.").await.unwrap();
    let session_id = turn.outcome.session_id.clone();

    let raw = turn.state.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    for key in [
        "session_id",
        "record",
        "status",
        "iteration_count",
        "max_iterations",
        "ledger",
        "pending_requests",
        "last_human_input_consumed_id",
    ] {
        assert!(value.get(key).is_some(), "missing {key}");
    }

    let restored = WorkflowState::from_json(&session_id, &raw).unwrap();
    assert_eq!(restored, turn.state);

    let answers = batch("m-1", json!({"business_brief.term": "6 months"}));
    let live = engine
        .continue_session(&session_id, turn.state, Some(answers.clone()))
        .await
        .unwrap();
    let resumed = engine
        .continue_session(&session_id, restored, Some(answers))
        .await
        .unwrap();

    assert_eq!(resumed.state.iteration_count, live.state.iteration_count);
    assert_eq!(resumed.state.record, live.state.record);
    assert_eq!(resumed.outcome.status, live.outcome.status);
}

#[tokio::test]
async fn stored_session_continues_across_processes() {
    let tmp = TempDir::new().unwrap();
    let store = JsonFileSessionStore::new(tmp.path());
    let engine = engine(ScriptedExtractor::repeating(incomplete_brief()));

    let turn = engine.start_session("Bank spot.").await.unwrap();
    store.save(&turn.state).await.unwrap();
    let session_id = turn.outcome.session_id.clone();

    let state = store.load(&session_id).await.unwrap();
    let turn = engine
        .continue_session(
            &session_id,
            state,
            Some(batch(
                "m-1",
                json!({
                    "business_brief.budget": "25k",
                    "business_brief.territory": ["France"],
                    "business_brief.media": ["TV"],
                    "deliverables.submission_deadline": "June 1"
                }),
            )),
        )
        .await
        .unwrap();
    store.save(&turn.state).await.unwrap();

    let reloaded = store.load(&session_id).await.unwrap();
    assert_eq!(reloaded.status, HitlStatus::Completed);
    assert_eq!(reloaded.iteration_count, 1);
    assert_eq!(reloaded.ledger.len(), 2);
    assert_eq!(store.load_brief(&session_id).await.unwrap(), "Bank spot.");

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, HitlStatus::Completed);
}

#[tokio::test]
async fn corrupt_session_can_restart_from_its_brief() {
    let tmp = TempDir::new().unwrap();
    let store = JsonFileSessionStore::new(tmp.path());
    let engine = engine(ScriptedExtractor::repeating(incomplete_brief()));

    let turn = engine.start_session("Bank spot, 30s TV.").await.unwrap();
    store.save(&turn.state).await.unwrap();
    let session_id = turn.outcome.session_id.clone();
    std::fs::write(tmp.path().join(format!("{session_id}.json")), "{\"session_id\": 7").unwrap();

    let err = store.load(&session_id).await.unwrap_err();
    assert!(matches!(err, SessionError::Corrupt { .. }));

    let brief = store.load_brief(&session_id).await.unwrap();
    let fresh = engine.start_session(&brief).await.unwrap();
    assert_ne!(fresh.state.session_id, session_id);
    assert_eq!(fresh.state.original_brief, "Bank spot, 30s TV.");
    assert_eq!(fresh.outcome.status, HitlStatus::Pending);
}
