use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wordlab_core::{
    fingerprint, CommunityReporter, CommunitySummary, ExperimentConfig, WordFrequency,
};
use wordlab_providers::HttpCommunityReporter;

fn summary() -> CommunitySummary {
    CommunitySummary {
        stimulus: "Name an animal".to_string(),
        stimulus_fingerprint: fingerprint("Name an animal"),
        models: vec!["gpt-4o-mini".to_string()],
        configs: vec![ExperimentConfig::new(1.0, 40)],
        samples_per_config: 2,
        total_samples: 2,
        unique_words: 1,
        entropy: 0.0,
        top_words: vec![WordFrequency {
            word: "cat".to_string(),
            count: 2,
            percentage: 100.0,
        }],
    }
}

#[tokio::test]
async fn test_submit_posts_summary_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/community"))
        .and(body_partial_json(json!({
            "stimulus": "Name an animal",
            "total_samples": 2,
            "models": ["gpt-4o-mini"]
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let reporter = HttpCommunityReporter::new(&format!("{}/api/community", server.uri())).unwrap();
    reporter.submit(&summary()).await.unwrap();
}

#[tokio::test]
async fn test_submit_surfaces_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let reporter = HttpCommunityReporter::new(&server.uri()).unwrap();
    assert!(reporter.submit(&summary()).await.is_err());
}

#[test]
fn test_rejects_invalid_endpoint() {
    assert!(HttpCommunityReporter::new("::not-a-url").is_err());
}
