//! Integration tests for GeminiEnhancer using wiremock.

#![allow(clippy::unwrap_used)]

use asir_core::config::AiConfig;
use asir_core::error::EnhancementError;
use asir_services::retry::RetryConfig;
use asir_services::seed::seed_governorates;
use asir_services::{DescriptionEnhancer, EnhancementStatus, GeminiEnhancer, Place};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn enhancer(server: &MockServer, api_key: Option<&str>) -> GeminiEnhancer {
    let config = AiConfig {
        api_key: api_key.map(str::to_string),
        base_url: server.uri(),
        ..AiConfig::default()
    };
    GeminiEnhancer::new(&config)
        .unwrap()
        .with_retry(RetryConfig::new(1, 1, 1))
}

/// Gemini response carrying `text` as the single candidate part
fn candidate(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ], "role": "model" } }
        ]
    })
}

fn abha_places() -> Vec<Place> {
    seed_governorates().remove(0).places
}

#[tokio::test]
async fn test_enhance_success_replaces_descriptions_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
            r#"["Misty heights above the city.", "A calm stay near the center."]"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let places = abha_places();
    let result = enhancer(&server, Some("test-key")).enhance(&places, "Abha").await;

    assert_eq!(result.status, EnhancementStatus::Enhanced);
    assert_eq!(
        result.places[0].description.as_deref(),
        Some("Misty heights above the city.")
    );
    assert_eq!(
        result.places[1].description.as_deref(),
        Some("A calm stay near the center.")
    );
    // everything but the description is untouched
    for (before, after) in places.iter().zip(&result.places) {
        assert_eq!(after.with_description("x"), before.with_description("x"));
    }
}

#[tokio::test]
async fn test_enhance_length_mismatch_returns_input() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(r#"["only one"]"#)))
        .mount(&server)
        .await;

    let places = abha_places();
    let result = enhancer(&server, Some("test-key")).enhance(&places, "Abha").await;

    assert_eq!(result.places, places);
    assert_eq!(
        result.status,
        EnhancementStatus::Failed(EnhancementError::LengthMismatch {
            expected: 2,
            actual: 1
        })
    );
}

#[tokio::test]
async fn test_enhance_without_key_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let places = abha_places();
    let gemini = enhancer(&server, None);
    assert!(!gemini.has_credential());

    let result = gemini.enhance(&places, "Abha").await;
    assert_eq!(result.places, places);
    assert_eq!(result.status, EnhancementStatus::MissingCredential);
}

#[tokio::test]
async fn test_enhance_server_error_is_retried_then_degrades() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(2)
        .mount(&server)
        .await;

    let places = abha_places();
    let result = enhancer(&server, Some("test-key")).enhance(&places, "Abha").await;

    assert_eq!(result.places, places);
    assert!(matches!(
        result.status,
        EnhancementStatus::Failed(EnhancementError::Request(_))
    ));
}

#[tokio::test]
async fn test_enhance_unparseable_text_degrades() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("Here you go!")))
        .mount(&server)
        .await;

    let places = abha_places();
    let result = enhancer(&server, Some("test-key")).enhance(&places, "Abha").await;

    assert_eq!(result.places, places);
    assert!(matches!(
        result.status,
        EnhancementStatus::Failed(EnhancementError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_enhance_empty_candidates_degrades() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
        )
        .mount(&server)
        .await;

    let places = abha_places();
    let result = enhancer(&server, Some("test-key")).enhance(&places, "Abha").await;
    assert_eq!(result.places, places);
    assert!(!result.is_enhanced());
}

#[tokio::test]
async fn test_summary_success_and_fallbacks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate("  Abha sits high in the clouds. Come see it.\n")),
        )
        .mount(&server)
        .await;

    let summary = enhancer(&server, Some("test-key")).summarize("Abha").await;
    assert_eq!(summary, "Abha sits high in the clouds. Come see it.");

    let summary = enhancer(&server, None).summarize("Abha").await;
    assert_eq!(summary, "Detailed tourism information coming soon.");
}

#[tokio::test]
async fn test_summary_failure_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let summary = enhancer(&server, Some("bad-key")).summarize("Namas").await;
    assert_eq!(summary, "Explore the beauty of Asir.");
}
