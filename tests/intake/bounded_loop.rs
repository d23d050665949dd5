use proptest::prelude::*;
use serde_json::json;

use briefloop::core::intake::HitlStatus;

use crate::support::{
    ScriptedExtractor, ScriptedResponder, batch, engine_with_budget, incomplete_brief,
};

#[tokio::test]
async fn silent_responder_cannot_keep_a_session_open() {
    for max_iterations in 0..=5 {
        let engine = engine_with_budget(ScriptedExtractor::repeating(incomplete_brief()), max_iterations);
        let responder = ScriptedResponder::silent();

        let turn = engine.drive("Bank spot.", &responder).await.unwrap();

        assert!(turn.state.is_terminal(), "budget {max_iterations}");
        assert!(!turn.outcome.requires_human_input);
        assert_eq!(turn.state.iteration_count, max_iterations);
        assert_eq!(responder.calls(), max_iterations as usize);
        let expected = if max_iterations == 0 {
            HitlStatus::Skipped
        } else {
            HitlStatus::Completed
        };
        assert_eq!(turn.outcome.status, expected);
    }
}

#[tokio::test]
async fn drive_stops_as_soon_as_critical_gaps_close() {
    let engine = engine_with_budget(ScriptedExtractor::repeating(incomplete_brief()), 3);
    let responder = ScriptedResponder::new(vec![
        json!({"business_brief.term": "perpetual", "deliverables.submission_deadline": "Mar 3"}),
        json!({
            "business_brief.budget": "40k",
            "business_brief.territory": ["Nordics"],
            "business_brief.media": ["Social"]
        }),
        json!({"creative_brief.genres": ["Ambient"]}),
    ]);

    let turn = engine.drive("Bank spot.", &responder).await.unwrap();

    assert_eq!(turn.outcome.status, HitlStatus::Completed);
    assert_eq!(responder.calls(), 2);
    assert_eq!(turn.state.iteration_count, 2);
    assert_eq!(turn.state.ledger.len(), 3);
    assert_eq!(turn.state.collected_answers.len(), 5);
}

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn any_turn_sequence_stays_within_budget(
        max_iterations in 0u32..4,
        turns in proptest::collection::vec(proptest::option::of(0u8..4), 0..10),
    ) {
        let engine = engine_with_budget(ScriptedExtractor::repeating(incomplete_brief()), max_iterations);
        run(async {
            let mut turn = engine.start_session("Bank spot.").await.unwrap();
            let session_id = turn.outcome.session_id.clone();
            let mut was_terminal = turn.state.is_terminal();

            for id in turns {
                let answers = id.map(|n| batch(&format!("m-{n}"), json!({"business_brief.term": format!("{n} years")})));
                let before = turn.state.iteration_count;
                turn = engine.continue_session(&session_id, turn.state, answers).await.unwrap();

                prop_assert!(turn.state.iteration_count <= max_iterations);
                prop_assert!(turn.state.iteration_count >= before);
                prop_assert!(turn.state.iteration_count <= before + 1);
                if was_terminal {
                    prop_assert!(turn.state.is_terminal());
                    prop_assert_eq!(turn.state.iteration_count, before);
                }
                was_terminal = turn.state.is_terminal();
            }
            Ok(())
        })?;
    }
}
