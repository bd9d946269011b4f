// Shared fixtures for reocam-core integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::time::Duration;

use reocam_core::{Credentials, Device, DeviceConfig, Scheme};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "tok-1";

/// Wrap a `value` payload in the device's response envelope.
pub fn envelope(cmd: &str, value: &Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!([{ "cmd": cmd, "code": 0, "value": value }]))
}

/// Descriptor advertising both siren and PTZ presets on channel 0.
pub fn full_ability() -> Value {
    json!({
        "Ability": {
            "abilityChn": [ { "ptzPreset": { "permit": 6, "ver": 1 } } ],
            "scheduleVersion": { "permit": 6, "ver": 1 }
        }
    })
}

/// Descriptor advertising neither.
pub fn bare_ability() -> Value {
    json!({
        "Ability": {
            "abilityChn": [ { "ptzPreset": { "permit": 0, "ver": 0 } } ],
            "scheduleVersion": { "permit": 0, "ver": 0 }
        }
    })
}

pub fn config_for(server: &MockServer) -> DeviceConfig {
    let url = Url::parse(&server.uri()).unwrap();
    let mut config = DeviceConfig::new(
        url.host_str().unwrap(),
        Credentials {
            username: "admin".into(),
            password: SecretString::from("secret".to_string()),
        },
    );
    config.scheme = Scheme::Http;
    config.port = url.port();
    config.timeout = Duration::from_secs(2);
    config.name = "front-door".into();
    config
}

pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api.cgi"))
        .and(query_param("cmd", "Login"))
        .respond_with(envelope(
            "Login",
            &json!({ "Token": { "leaseTime": 3600, "name": TOKEN } }),
        ))
        .mount(server)
        .await;
}

pub async fn mount_ability(server: &MockServer, ability: Value) {
    Mock::given(method("POST"))
        .and(query_param("cmd", "GetAbility"))
        .respond_with(envelope("GetAbility", &ability))
        .mount(server)
        .await;
}

/// A device holding a session token and the given ability descriptor, with
/// no background tasks running.
pub async fn connected_device(server: &MockServer, ability: Value) -> Device {
    mount_login(server).await;
    mount_ability(server, ability).await;
    let device = Device::new(config_for(server)).unwrap();
    device.session().acquire_token().await.unwrap();
    device.capabilities().ensure_loaded().await.unwrap();
    device
}

/// Number of requests the server has seen for `cmd`.
pub async fn count_cmd(server: &MockServer, cmd: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.query_pairs().any(|(k, v)| k == "cmd" && v == cmd))
        .count()
}
