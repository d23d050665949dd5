use serde_json::json;

use briefloop::core::intake::{
    FieldRegistry, HitlStatus, InfoRequest, MissingFieldDetector, RequestPriority,
    StructuredRecord, merge_into_record,
};

use crate::support::{
    ScriptedExtractor, batch, complete_brief, engine, engine_with_budget, incomplete_brief,
};

#[test]
fn blank_budget_and_empty_territory_are_critical_gaps() {
    let registry = FieldRegistry::reference();
    let record = StructuredRecord::from_value(json!({
        "business_brief": {"budget": "", "territory": [], "media": ["TV"], "term": "1 year"},
        "creative_brief": {"genres": ["Pop"]},
        "deliverables": {"submission_deadline": "Friday"}
    }))
    .unwrap();

    let missing = MissingFieldDetector::new(registry).detect(&record);
    assert_eq!(
        missing.paths(),
        ["business_brief.budget", "business_brief.territory"]
    );

    let request = InfoRequest::build("s-1", &missing, &registry);
    assert_eq!(request.priority, RequestPriority::Critical);
    assert!(request.request_message.contains("critical for accurate project scoping"));
}

#[tokio::test]
async fn well_extracted_brief_completes_on_first_turn() {
    let turn = engine(ScriptedExtractor::repeating(complete_brief()))
        .start_session("Nordlicht Bank spot, Germany and Austria, TV and online.")
        .await
        .unwrap();

    assert_eq!(turn.outcome.status, HitlStatus::Completed);
    assert!(!turn.outcome.requires_human_input);
    assert!(turn.state.pending_requests.is_empty());
    let confidence = turn.outcome.confidence.unwrap();
    assert!(confidence.score >= 0.8, "score was {}", confidence.score);
    assert_eq!(confidence.level.to_string(), "high");
}

#[tokio::test]
async fn unanswered_turns_complete_once_budget_is_spent() {
    let engine = engine_with_budget(ScriptedExtractor::repeating(incomplete_brief()), 3);
    let mut turn = engine.start_session("Bank spot.").await.unwrap();
    let score = turn.outcome.confidence.unwrap().score;
    assert!((score - 0.3).abs() < 0.01, "score was {score}");
    assert_eq!(turn.outcome.status, HitlStatus::Pending);

    let session_id = turn.outcome.session_id.clone();
    for (n, expected) in [
        (1, HitlStatus::Pending),
        (2, HitlStatus::Pending),
        (3, HitlStatus::Completed),
    ] {
        turn = engine
            .continue_session(&session_id, turn.state, Some(batch(&format!("m-{n}"), json!({}))))
            .await
            .unwrap();
        assert_eq!(turn.outcome.status, expected, "after turn {n}");
        assert_eq!(turn.state.iteration_count, n);
    }

    assert!(turn.outcome.confidence.unwrap().score < 0.6);
    assert!(!turn.outcome.requires_human_input);
    assert!(turn.outcome.info_request.is_none());
    assert_eq!(turn.state.pending_requests.len(), 3);
}

#[test]
fn answer_replaces_non_mapping_category() {
    let registry = FieldRegistry::reference();
    let record = StructuredRecord::from_value(json!({"business_brief": null})).unwrap();
    let answers = batch("m", json!({"business_brief.budget": "50000-75000"})).answers;

    let merged = merge_into_record(&record, &answers, &registry);
    assert_eq!(
        merged.get("business_brief"),
        Some(&json!({"budget": "50000-75000"}))
    );
    assert_eq!(merged.extraction_status(), Some("enhanced"));
}

#[tokio::test]
async fn repeated_batch_id_does_not_advance_the_session() {
    let engine = engine(ScriptedExtractor::repeating(incomplete_brief()));
    let turn = engine.start_session("Bank spot.").await.unwrap();
    let session_id = turn.outcome.session_id.clone();

    let answers = json!({"business_brief.term": "2 years"});
    let first = engine
        .continue_session(&session_id, turn.state, Some(batch("msg-42", answers.clone())))
        .await
        .unwrap();
    assert_eq!(first.state.iteration_count, 1);
    assert_eq!(first.outcome.status, HitlStatus::Pending);

    let second = engine
        .continue_session(&session_id, first.state.clone(), Some(batch("msg-42", answers)))
        .await
        .unwrap();
    assert_eq!(second.state.iteration_count, 1);
    assert_eq!(second.state.ledger.len(), first.state.ledger.len());
    assert_eq!(second.state.record, first.state.record);
    assert_eq!(second.state.pending_requests.len(), first.state.pending_requests.len());
}

#[tokio::test]
async fn same_unconsumed_batch_gives_same_state_from_same_start() {
    let engine = engine(ScriptedExtractor::repeating(incomplete_brief()));
    let turn = engine.start_session("Bank spot.").await.unwrap();
    let session_id = turn.outcome.session_id.clone();
    let answers = batch("msg-1", json!({"business_brief.media": ["Cinema"]}));

    let a = engine
        .continue_session(&session_id, turn.state.clone(), Some(answers.clone()))
        .await
        .unwrap();
    let b = engine
        .continue_session(&session_id, turn.state, Some(answers))
        .await
        .unwrap();

    assert_eq!(a.state.iteration_count, b.state.iteration_count);
    assert_eq!(a.state.record, b.state.record);
    assert_eq!(a.state.working_brief, b.state.working_brief);
    assert_eq!(a.state.collected_answers, b.state.collected_answers);
}

#[tokio::test]
async fn enhanced_text_is_rebuilt_from_the_original_each_turn() {
    let engine = engine(ScriptedExtractor::repeating(incomplete_brief()));
    let turn = engine.start_session("Bank spot.").await.unwrap();
    let session_id = turn.outcome.session_id.clone();

    let turn = engine
        .continue_session(
            &session_id,
            turn.state,
            Some(batch("m-1", json!({"business_brief.term": "1 year"}))),
        )
        .await
        .unwrap();
    let turn = engine
        .continue_session(
            &session_id,
            turn.state,
            Some(batch(
                "m-2",
                json!({
                    "business_brief.term": "2 years",
                    "deliverables.submission_deadline": "Friday"
                }),
            )),
        )
        .await
        .unwrap();

    let text = &turn.state.working_brief;
    assert!(text.starts_with("Bank spot."));
    assert_eq!(text.matches("Bank spot.").count(), 1);
    assert_eq!(text.matches("=== ADDITIONAL INFORMATION PROVIDED ===").count(), 1);
    assert!(text.contains("License Term: 2 years"));
    assert!(!text.contains("License Term: 1 year"));
    assert!(text.contains("Submission Deadline: Friday"));
    assert_eq!(turn.outcome.status, HitlStatus::Pending);
}
