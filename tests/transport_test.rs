//! Wiremock tests for HttpTransport: request shape, auth header,
//! and status-code mapping.

use mockmill::provider::wire::{build_request, parse_response};
use mockmill::provider::{CredentialStore, GenerateTransport, HttpTransport, StaticCredentials};
use mockmill::{GenError, ImageInput, RequestConfig};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-2.0-flash-exp";

#[tokio::test]
async fn posts_expected_body_with_bearer_auth() {
    let mock_server = MockServer::start().await;

    let response = serde_json::json!({
        "candidates": [{
            "content": { "parts": [
                { "text": "a mug " },
                { "text": "mockup" },
                { "inlineData": { "mimeType": "image/png", "data": "QUJD" } }
            ]},
            "finishReason": "STOP"
        }]
    });

    let expected_body = serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": "a mug" },
                { "inlineData": { "mimeType": "image/png", "data": "aW1n" } }
            ]
        }],
        "generationConfig": { "temperature": 0.5 }
    });

    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{MODEL}:generateContent")))
        .and(header("Authorization", "Bearer test_key"))
        .and(body_partial_json(expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport =
        HttpTransport::with_base_url(StaticCredentials::new("test_key"), mock_server.uri());
    let config = RequestConfig::new(MODEL).temperature(0.5);

    let raw = transport
        .generate(
            MODEL,
            &build_request("a mug", &[ImageInput::png("aW1n")], &config),
        )
        .await
        .expect("generate should succeed");

    let parsed = parse_response(raw).unwrap();
    assert_eq!(parsed.text.as_deref(), Some("a mug mockup"));
    assert_eq!(parsed.image.as_deref(), Some("data:image/png;base64,QUJD"));
    assert_eq!(parsed.finish_reason.as_deref(), Some("STOP"));
}

#[tokio::test]
async fn missing_credential_is_unauthorized_without_network() {
    struct EmptyStore;
    impl CredentialStore for EmptyStore {
        fn api_key(&self) -> Option<String> {
            None
        }
    }

    let mock_server = MockServer::start().await;
    let transport = HttpTransport::with_base_url(EmptyStore, mock_server.uri());
    let config = RequestConfig::new(MODEL);

    let result = transport
        .generate(MODEL, &build_request("a mug", &[], &config))
        .await;

    assert!(matches!(result, Err(GenError::Unauthorized)));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn status_401_maps_to_unauthorized() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let transport =
        HttpTransport::with_base_url(StaticCredentials::new("bad_key"), mock_server.uri());
    let config = RequestConfig::new(MODEL);
    let result = transport
        .generate(MODEL, &build_request("a mug", &[], &config))
        .await;

    assert!(matches!(result, Err(GenError::Unauthorized)));
}

#[tokio::test]
async fn status_429_carries_retry_after_hint() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&mock_server)
        .await;

    let transport =
        HttpTransport::with_base_url(StaticCredentials::new("test_key"), mock_server.uri());
    let config = RequestConfig::new(MODEL);
    let result = transport
        .generate(MODEL, &build_request("a mug", &[], &config))
        .await;

    match result {
        Err(GenError::RateLimited { retry_after }) => {
            assert_eq!(retry_after, Some(std::time::Duration::from_secs(30)));
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn status_503_maps_to_overloaded() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let transport =
        HttpTransport::with_base_url(StaticCredentials::new("test_key"), mock_server.uri());
    let config = RequestConfig::new(MODEL);
    let result = transport
        .generate(MODEL, &build_request("a mug", &[], &config))
        .await;

    assert!(matches!(result, Err(GenError::ServiceOverloaded)));
}

#[tokio::test]
async fn safety_block_in_error_body_maps_to_content_blocked() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("prompt was blocked by safety filters"),
        )
        .mount(&mock_server)
        .await;

    let transport =
        HttpTransport::with_base_url(StaticCredentials::new("test_key"), mock_server.uri());
    let config = RequestConfig::new(MODEL);
    let result = transport
        .generate(MODEL, &build_request("a mug", &[], &config))
        .await;

    assert!(matches!(result, Err(GenError::ContentBlocked { .. })));
}

#[tokio::test]
async fn api_key_never_appears_in_the_url() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
        })))
        .mount(&mock_server)
        .await;

    let transport =
        HttpTransport::with_base_url(StaticCredentials::new("sekrit"), mock_server.uri());
    let config = RequestConfig::new(MODEL);
    transport
        .generate(MODEL, &build_request("a mug", &[], &config))
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].url.as_str().contains("sekrit"));
    let auth = requests[0]
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(auth, "Bearer sekrit");
}
