//! HTTP-level tests for the Gemini client against a mock server.

use gemini_client::{GeminiClient, GeminiError, TextGenerator};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reply_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            {
                "content": {"parts": [{"text": text}], "role": "model"},
                "finishReason": "STOP"
            }
        ]
    })
}

#[tokio::test]
async fn generate_sends_contract_body_and_extracts_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "k123"))
        .and(body_json(json!({
            "contents": [{"parts": [{"text": "di hola"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("hola")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("k123").with_base_url(server.uri());
    let reply = client.generate("di hola").await.unwrap();
    assert_eq!(reply, "hola");
}

#[tokio::test]
async fn custom_model_lands_in_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("k")
        .with_base_url(server.uri())
        .with_model("gemini-1.5-pro");
    assert_eq!(client.generate("x").await.unwrap(), "ok");
}

#[tokio::test]
async fn non_success_status_surfaces_status_and_body() {
    let server = MockServer::start().await;

    // expect(1) also pins the single-attempt behavior: no retry follows.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("temporarily overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("k").with_base_url(server.uri());
    let err = client.generate("x").await.unwrap_err();
    match err {
        GeminiError::Api { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "temporarily overloaded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn auth_status_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("key not valid"))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("bad").with_base_url(server.uri());
    let err = client.generate("x").await.unwrap_err();
    match err {
        GeminiError::Auth(detail) => assert!(detail.contains("key not valid")),
        other => panic!("expected Auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_candidates_is_missing_text_with_raw_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("k").with_base_url(server.uri());
    let err = client.generate("x").await.unwrap_err();
    match err {
        GeminiError::MissingText { raw } => assert!(raw.contains("candidates")),
        other => panic!("expected MissingText, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_success_body_is_missing_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("k").with_base_url(server.uri());
    let err = client.generate("x").await.unwrap_err();
    match err {
        GeminiError::MissingText { raw } => assert!(raw.contains("proxy page")),
        other => panic!("expected MissingText, got {other:?}"),
    }
}
