use serde_json::json;

use briefloop::core::intake::{HitlStatus, StructuredRecord};
use briefloop::error::ExtractionError;

use crate::support::{ScriptedExtractor, batch, engine, engine_with_budget, incomplete_brief};

fn unparsable() -> ExtractionError {
    ExtractionError::Unparsable {
        message: "expected value at line 1 column 1".into(),
        raw_output: "Sorry, I cannot help with that.".into(),
    }
}

#[tokio::test]
async fn failed_extraction_yields_flagged_record_and_a_request() {
    let extractor = ScriptedExtractor::scripted(vec![Err(unparsable())], incomplete_brief());
    let turn = engine(extractor).start_session("???").await.unwrap();

    let record = turn.state.record.as_ref().unwrap();
    assert!(record.is_degraded());
    assert!(!record.json_structure_valid());
    assert_eq!(record.get("raw_output"), Some(&json!("Sorry, I cannot help with that.")));
    assert!(record.extraction_notes().starts_with("Automatic extraction failed."));

    assert_eq!(turn.outcome.status, HitlStatus::Pending);
    assert!(turn.outcome.requires_human_input);
    assert!(turn.outcome.confidence.unwrap().score < 0.1);
    let quality = turn.outcome.quality.unwrap();
    assert!(!quality.analysis_complete);
    assert!(!quality.production_ready);
}

#[tokio::test]
async fn failed_extraction_with_no_budget_is_skipped() {
    let extractor = ScriptedExtractor::scripted(
        vec![Err(ExtractionError::Failed("connection reset".into()))],
        incomplete_brief(),
    );
    let turn = engine_with_budget(extractor, 0)
        .start_session("brief")
        .await
        .unwrap();

    assert_eq!(turn.outcome.status, HitlStatus::Skipped);
    assert!(!turn.outcome.requires_human_input);
    assert!(turn.state.record.as_ref().is_some_and(StructuredRecord::is_degraded));
}

#[tokio::test]
async fn answers_merge_onto_degraded_record() {
    let extractor = ScriptedExtractor::scripted(vec![Err(unparsable())], incomplete_brief());
    let engine = engine(extractor);
    let turn = engine.start_session("brief").await.unwrap();
    let session_id = turn.outcome.session_id.clone();

    let turn = engine
        .continue_session(
            &session_id,
            turn.state,
            Some(batch(
                "m-1",
                json!({
                    "business_brief.budget": "10k",
                    "business_brief.territory": ["Worldwide"],
                    "business_brief.media": ["Online"],
                    "deliverables.submission_deadline": "next Monday"
                }),
            )),
        )
        .await
        .unwrap();

    let record = turn.state.record.unwrap();
    assert_eq!(record.extraction_status(), Some("enhanced"));
    assert_eq!(record.get_path("business_brief.budget"), Some(&json!("10k")));
    assert!(record.extraction_notes().contains("Enhanced with user-provided information"));
    assert_eq!(turn.outcome.status, HitlStatus::Completed);
}

#[tokio::test]
async fn malformed_entries_are_dropped_and_the_rest_merge() {
    let engine = engine(ScriptedExtractor::repeating(incomplete_brief()));
    let turn = engine.start_session("brief").await.unwrap();
    let session_id = turn.outcome.session_id.clone();

    let turn = engine
        .continue_session(
            &session_id,
            turn.state,
            Some(batch(
                "m-1",
                json!({
                    "business_brief.budget": "15k",
                    "business_brief.media": null,
                    "business_brief..term": "1 year",
                    "deliverables": {"submission_deadline": "Friday"},
                    "creative_brief.tempo": "120 bpm"
                }),
            )),
        )
        .await
        .unwrap();

    let record = turn.state.record.as_ref().unwrap();
    assert_eq!(record.get_path("business_brief.budget"), Some(&json!("15k")));
    assert_eq!(record.get_path("creative_brief.tempo"), Some(&json!("120 bpm")));
    assert!(record.get_path("deliverables.submission_deadline").is_none());
    assert_eq!(turn.state.iteration_count, 1);

    let answered = turn
        .state
        .ledger
        .latest()
        .and_then(|entry| entry.human_input_this_iteration.clone())
        .unwrap();
    assert_eq!(answered.len(), 2);
    assert!(answered.contains_key("creative_brief.tempo"));
}

#[tokio::test]
async fn untracked_answer_does_not_clear_tracked_gaps() {
    let engine = engine(ScriptedExtractor::repeating(incomplete_brief()));
    let turn = engine.start_session("brief").await.unwrap();
    let session_id = turn.outcome.session_id.clone();
    let before = turn.outcome.quality.clone().unwrap().missing_fields_count;

    let turn = engine
        .continue_session(
            &session_id,
            turn.state,
            Some(batch("m-1", json!({"creative_brief.tempo": "slow"}))),
        )
        .await
        .unwrap();

    assert_eq!(turn.outcome.quality.unwrap().missing_fields_count, before);
    assert_eq!(turn.outcome.status, HitlStatus::Pending);
}

#[tokio::test]
async fn retry_after_transient_failure_replaces_degraded_record() {
    let extractor = ScriptedExtractor::scripted(
        vec![Err(ExtractionError::Failed("429 too many requests".into()))],
        json!({
            "extraction_status": "complete",
            "business_brief": {
                "client": "A", "agency": "B", "budget": "5k",
                "territory": ["DE"], "media": ["Radio"]
            },
            "creative_brief": {"genres": ["Jazz"]},
            "deliverables": {"submission_deadline": "tomorrow"}
        }),
    );
    let engine = engine(extractor);
    let turn = engine.start_session("brief").await.unwrap();
    assert!(turn.state.record.as_ref().unwrap().is_degraded());

    let session_id = turn.outcome.session_id.clone();
    let turn = engine.continue_session(&session_id, turn.state, None).await.unwrap();

    assert!(!turn.state.record.as_ref().unwrap().is_degraded());
    assert_eq!(turn.state.iteration_count, 0);
    assert_eq!(turn.state.ledger.len(), 2);
    assert_eq!(turn.outcome.status, HitlStatus::Completed);
}
