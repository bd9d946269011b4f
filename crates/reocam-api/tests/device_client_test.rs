#![allow(clippy::unwrap_used)]
// Integration tests for `DeviceClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reocam_api::{CommandRequest, DeviceClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DeviceClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = DeviceClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn token() -> SecretString {
    SecretString::from("tok-123".to_string())
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api.cgi"))
        .and(query_param("cmd", "Login"))
        .and(body_json(json!([{
            "cmd": "Login",
            "param": { "User": { "Version": "0", "userName": "admin", "password": "hunter2" } }
        }])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "cmd": "Login",
            "code": 0,
            "value": { "Token": { "leaseTime": 3600, "name": "abc123" } }
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let secret = SecretString::from("hunter2".to_string());
    let token = client.login("admin", &secret).await.unwrap();
    assert_eq!(token.name, "abc123");
    assert_eq!(token.lease_time, Some(3600));
}

#[tokio::test]
async fn test_login_without_token_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(query_param("cmd", "Login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "cmd": "Login",
            "code": 0,
            "value": {}
        }])))
        .mount(&server)
        .await;

    let secret = SecretString::from("hunter2".to_string());
    let result = client.login("admin", &secret).await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_login_rejected_in_band() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(query_param("cmd", "Login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "cmd": "Login",
            "code": 1,
            "error": { "rspCode": -7, "detail": "login failed" }
        }])))
        .mount(&server)
        .await;

    let secret = SecretString::from("wrong".to_string());
    match client.login("admin", &secret).await {
        Err(Error::Authentication { ref message }) => {
            assert!(message.contains("-7"), "unexpected message: {message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_login_unreachable_is_transport_error() {
    // Port 9 (discard) on localhost is not served by anything in CI.
    let client = DeviceClient::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:9").unwrap(),
    );
    let secret = SecretString::from("x".to_string());
    let result = client.login("admin", &secret).await;
    assert!(
        matches!(result, Err(ref e) if e.is_transport()),
        "expected transport error, got: {result:?}"
    );
}

// ── Command tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_execute_returns_value_payload() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api.cgi"))
        .and(query_param("cmd", "GetWhiteLed"))
        .and(query_param("token", "tok-123"))
        .and(body_json(json!([{
            "cmd": "GetWhiteLed",
            "action": 0,
            "param": { "channel": 0 }
        }])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "cmd": "GetWhiteLed",
            "code": 0,
            "value": { "WhiteLed": { "state": 1, "channel": 0 } }
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let value = client
        .execute(&token(), &CommandRequest::get_white_led(0))
        .await
        .unwrap();
    assert_eq!(value, json!({ "WhiteLed": { "state": 1, "channel": 0 } }));
}

#[tokio::test]
async fn test_execute_missing_value_is_empty_response() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(query_param("cmd", "GetMdState"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "cmd": "GetMdState",
            "code": 0
        }])))
        .mount(&server)
        .await;

    let result = client
        .execute(&token(), &CommandRequest::get_md_state(0))
        .await;
    assert!(
        matches!(result, Err(Error::EmptyResponse { ref cmd }) if cmd == "GetMdState"),
        "expected EmptyResponse, got: {result:?}"
    );
}

#[tokio::test]
async fn test_execute_in_band_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(query_param("cmd", "GetAiState"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "cmd": "GetAiState",
            "code": 1,
            "error": { "rspCode": -6, "detail": "please login first" }
        }])))
        .mount(&server)
        .await;

    let err = client
        .execute(&token(), &CommandRequest::get_ai_state(0))
        .await
        .unwrap_err();
    assert_eq!(err.rsp_code(), Some(-6));
}

#[tokio::test]
async fn test_execute_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let result = client
        .execute(&token(), &CommandRequest::get_ir_lights(0))
        .await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_execute_http_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = client
        .execute(&token(), &CommandRequest::get_ptz_preset(0))
        .await;
    assert!(
        matches!(result, Err(Error::Http { status: 502, .. })),
        "expected Http error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_execute_malformed_multibyte_body() {
    let (server, client) = setup().await;

    let body = format!("{}€ not json", "x".repeat(199));
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
        .mount(&server)
        .await;

    match client
        .execute(&token(), &CommandRequest::get_white_led(0))
        .await
    {
        Err(Error::Deserialization { body: kept, .. }) => assert_eq!(kept, body),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_login_malformed_shapes_are_authentication_errors() {
    let (server, client) = setup().await;
    let secret = SecretString::from("hunter2".to_string());

    for reply in [json!([]), json!({ "unexpected": true })] {
        server.reset().await;
        Mock::given(method("POST"))
            .and(query_param("cmd", "Login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply.clone()))
            .mount(&server)
            .await;

        let result = client.login("admin", &secret).await;
        assert!(
            matches!(result, Err(Error::Authentication { .. })),
            "expected Authentication error for {reply}, got: {result:?}"
        );
    }
}
