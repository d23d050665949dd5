use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use briefloop::config::LlmConfig;
use briefloop::core::extraction::LlmBriefExtractor;
use briefloop::core::intake::{HitlOrchestrator, HitlStatus};

fn config(base_url: &str) -> LlmConfig {
    LlmConfig {
        provider_name: "groq".into(),
        base_url: base_url.into(),
        api_key: Some("gsk_test_key".into()),
        ..LlmConfig::default()
    }
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

#[tokio::test]
async fn fenced_model_output_is_extracted_and_scored() {
    let server = MockServer::start().await;
    let content = "Here is the brief:\n```json\n{\"extraction_status\": \"complete\", \
        \"business_brief\": {\"client\": \"M\\u00fcller\", \"budget\": \"20k\", \
        \"territory\": [\"DE\"], \"media\": [\"TV\"]}, \
        \"creative_brief\": {\"genres\": [\"Pop\"]}, \
        \"deliverables\": {\"submission_deadline\": \"Friday\"}}\n```";
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(content))
        .expect(1)
        .mount(&server)
        .await;

    let extractor = LlmBriefExtractor::from_config(&config(&server.uri()));
    let turn = HitlOrchestrator::new(Arc::new(extractor))
        .start_session("Müller spot for German TV.")
        .await
        .unwrap();

    let record = turn.state.record.unwrap();
    assert!(record.json_structure_valid());
    assert_eq!(record.get_path("business_brief.client"), Some(&json!("Müller")));
    assert_eq!(turn.outcome.status, HitlStatus::Completed);
}

#[tokio::test]
async fn provider_error_degrades_instead_of_failing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .mount(&server)
        .await;

    let extractor = LlmBriefExtractor::from_config(&config(&server.uri()));
    let turn = HitlOrchestrator::new(Arc::new(extractor))
        .start_session("Any brief")
        .await
        .unwrap();

    let record = turn.state.record.unwrap();
    assert!(record.is_degraded());
    assert!(record.extraction_notes().contains("503"));
    assert!(turn.outcome.requires_human_input);
}

#[tokio::test]
async fn prose_only_output_keeps_raw_text_for_review() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("I could not find any brief details."))
        .mount(&server)
        .await;

    let extractor = LlmBriefExtractor::from_config(&config(&server.uri()));
    let turn = HitlOrchestrator::new(Arc::new(extractor))
        .start_session("Any brief")
        .await
        .unwrap();

    let record = turn.state.record.unwrap();
    assert!(record.is_degraded());
    assert_eq!(
        record.get("raw_output"),
        Some(&json!("I could not find any brief details."))
    );
}
