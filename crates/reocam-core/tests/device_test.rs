#![allow(clippy::unwrap_used)]
// Device lifecycle: session task, attached nodes, and shutdown.

mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::query_param;
use wiremock::{Mock, MockServer, ResponseTemplate};

use reocam_core::{
    ConnectionStatus, CoreError, Device, FeatureKind, FeatureStatus, NodeOptions,
};

use common::{config_for, count_cmd, envelope, full_ability, mount_ability, mount_login};

const WAIT: Duration = Duration::from_secs(3);

async fn wait_connected(device: &Device) {
    let mut status = device.connection_status();
    tokio::time::timeout(WAIT, status.wait_for(ConnectionStatus::is_connected))
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn start_connects_and_loads_capabilities() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_ability(&server, full_ability()).await;
    let device = Device::new(config_for(&server)).unwrap();

    device.start().await;
    wait_connected(&device).await;

    tokio::time::timeout(WAIT, async {
        while !device.capabilities().is_loaded() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    device.stop().await;
    assert!(!device.session().has_token());
}

#[tokio::test]
async fn token_is_renewed_on_a_fixed_period() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_ability(&server, full_ability()).await;
    let mut config = config_for(&server);
    config.renewal_interval = Duration::from_millis(100);
    let device = Device::new(config).unwrap();

    device.start().await;
    tokio::time::sleep(Duration::from_millis(450)).await;
    device.stop().await;

    assert!(count_cmd(&server, "Login").await >= 3);
    assert_eq!(count_cmd(&server, "GetAbility").await, 1);
}

#[tokio::test]
async fn attached_poller_emits_and_stops_cleanly() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_ability(&server, full_ability()).await;
    Mock::given(query_param("cmd", "GetWhiteLed"))
        .respond_with(envelope("GetWhiteLed", &json!({ "WhiteLed": { "state": 1 } })))
        .mount(&server)
        .await;
    let device = Device::new(config_for(&server)).unwrap();
    device.start().await;
    let node = device
        .attach_with(
            FeatureKind::WhiteLight,
            NodeOptions {
                topic: Some("porch".into()),
                interval: Some(Duration::from_millis(30)),
            },
        )
        .await;
    let mut events = node.subscribe();

    let event = tokio::time::timeout(WAIT, events.recv()).await.unwrap().unwrap();
    assert_eq!(event.payload, json!(true));
    assert_eq!(event.topic, "porch");
    assert_eq!(node.current_status().to_string(), "Connected | On");

    device.stop().await;
    let polled = count_cmd(&server, "GetWhiteLed").await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(count_cmd(&server, "GetWhiteLed").await, polled);
}

#[tokio::test]
async fn alarm_node_mirrors_session_health() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_ability(&server, full_ability()).await;
    let device = Device::new(config_for(&server)).unwrap();
    let node = device
        .attach_with(
            FeatureKind::Alarm,
            NodeOptions {
                topic: None,
                interval: Some(Duration::from_millis(20)),
            },
        )
        .await;
    assert_eq!(node.topic(), "front-door");

    device.start().await;
    let mut status = node.status();
    tokio::time::timeout(
        WAIT,
        status.wait_for(|s| matches!(s, FeatureStatus::Connected { .. })),
    )
    .await
    .unwrap()
    .unwrap();

    device.stop().await;
}

#[tokio::test]
async fn rejected_login_surfaces_on_the_status() {
    let server = MockServer::start().await;
    Mock::given(query_param("cmd", "Login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "cmd": "Login",
            "code": 1,
            "error": { "rspCode": -7, "detail": "login failed" }
        }])))
        .mount(&server)
        .await;
    let device = Device::new(config_for(&server)).unwrap();

    device.start().await;
    let mut status = device.connection_status();
    let reached = tokio::time::timeout(
        WAIT,
        status.wait_for(|s| matches!(s, ConnectionStatus::Error(_))),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    device.stop().await;

    assert_eq!(reached.to_string(), "Error: Received invalid token");
}

#[tokio::test]
async fn oneshot_runs_with_a_session() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_ability(&server, full_ability()).await;
    Mock::given(query_param("cmd", "GetMdState"))
        .respond_with(envelope("GetMdState", &json!({ "state": 1 })))
        .mount(&server)
        .await;

    let value = Device::oneshot(config_for(&server), |device| async move {
        assert!(device.capabilities().is_loaded());
        device.gateway().send(&reocam_core::Command::GetMotionState).await
    })
    .await
    .unwrap();

    assert_eq!(value, json!({ "state": 1 }));
}

#[tokio::test]
async fn oneshot_fails_without_login() {
    let server = MockServer::start().await;
    Mock::given(query_param("cmd", "Login"))
        .respond_with(envelope("Login", &json!({})))
        .mount(&server)
        .await;

    let result = Device::oneshot(config_for(&server), |_device| async { Ok(()) }).await;

    assert!(matches!(result, Err(CoreError::AuthenticationFailed { .. })));
}
