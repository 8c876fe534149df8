//! Integration tests for `HttpCollaborator` and `Guarded` using wiremock HTTP mocks.

use std::time::Duration;

use vgate_collab::{mock_idea, Collaborator, CollabError, Guarded, HttpCollaborator, Source};
use vgate_core::{Channel, ContentType};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> HttpCollaborator {
    HttpCollaborator::with_base_url(base_url, Some("test-key"), 5)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn generate_idea_parses_payload() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "title": "Five pantry swaps that cut plastic",
        "description": "Low-effort changes with measurable impact",
        "content_type": "video",
        "viral_potential": 0.85,
        "keywords": ["zero waste", "pantry", "Zero Waste"],
        "estimated_revenue": 320.0
    });

    Mock::given(method("POST"))
        .and(path("/ideas"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({ "niche": "sustainable living" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let idea = client
        .generate_idea("sustainable living", 0)
        .await
        .expect("should parse idea");

    assert_eq!(idea.niche, "sustainable living");
    assert_eq!(idea.content_type, ContentType::Video);
    assert!((idea.viral_potential - 0.85).abs() < f64::EPSILON);
    assert_eq!(idea.keywords, vec!["zero waste", "pantry"]);
}

#[tokio::test]
async fn generate_idea_sends_quality_bias() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ideas"))
        .and(body_partial_json(serde_json::json!({ "quality_bias": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "title": "t",
            "description": "d",
            "viral_potential": 0.9
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let idea = client.generate_idea("travel", 2).await.expect("idea");
    assert_eq!(idea.content_type, ContentType::Post);
}

#[tokio::test]
async fn generate_idea_with_missing_fields_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ideas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "title": "only" })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.generate_idea("travel", 0).await.unwrap_err();
    assert!(matches!(err, CollabError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn assess_quality_returns_score() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/assess"))
        .and(body_partial_json(serde_json::json!({ "context": "idea" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "score": 0.77 })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let score = client.assess_quality("text", "idea").await.expect("score");
    assert!((score - 0.77).abs() < f64::EPSILON);
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/assess"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.assess_quality("text", "idea").await.unwrap_err();
    assert!(matches!(err, CollabError::Status(s) if s.as_u16() == 503));
}

#[tokio::test]
async fn adapt_for_channel_returns_copy() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/adapt"))
        .and(body_partial_json(serde_json::json!({ "channel": "tiktok" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "title": "60s pantry swap",
            "description": "Hook in the first second"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let idea = mock_idea("sustainable living", 0);
    let adapted = client
        .adapt_for_channel(&idea, Channel::TikTok, 0)
        .await
        .expect("adaptation");
    assert_eq!(adapted.title, "60s pantry swap");
}

#[tokio::test]
async fn guarded_recovers_from_malformed_score() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/assess"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "score": "great" })))
        .mount(&server)
        .await;

    let guarded = Guarded::new(test_client(&server.uri()), Duration::from_secs(5));
    let scored = guarded.assess_quality("text", "idea", 0.81).await;
    assert_eq!(scored.source, Source::Fallback);
    assert!((scored.value - 0.81).abs() < f64::EPSILON);
}

#[tokio::test]
async fn guarded_times_out_slow_service() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/assess"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "score": 0.99 }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let guarded = Guarded::new(test_client(&server.uri()), Duration::from_millis(100));
    let scored = guarded.assess_quality("text", "idea", 0.4).await;
    assert_eq!(scored.source, Source::Fallback);
    assert!((scored.value - 0.4).abs() < f64::EPSILON);
}

#[tokio::test]
async fn guarded_unreachable_service_synthesizes_idea() {
    // Nothing listens on port 1.
    let guarded = Guarded::new(test_client("http://127.0.0.1:1"), Duration::from_secs(2));
    let idea = guarded.generate_idea("home fitness", 0).await;
    assert!(idea.is_fallback());
    assert_eq!(idea.value.id, mock_idea("home fitness", 0).id);
}
