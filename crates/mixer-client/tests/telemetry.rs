//! Telemetry and actuator clients against in-process servers.

use axum::{http::StatusCode, routing::get, Router};
use mixer_client::{ActuatorClient, ClientError, TelemetryClient};
use mixer_core::catalog::{ParamId, ParameterDefinition, StatusFlag};
use mixer_core::{LedAction, ParameterUpdate};
use mixer_mock::{MockDevice, MockMonitor, MockResponder};
use mixer_relay::{CommandRelay, Facade, RelayTarget};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

const TIMEOUT: Duration = Duration::from_secs(2);

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await });
    addr
}

async fn spawn_mock(device: MockDevice) -> TelemetryClient {
    let addr = serve(MockMonitor::new(device).router()).await;
    TelemetryClient::new(&format!("http://{addr}"), TIMEOUT).unwrap()
}

#[tokio::test]
async fn test_fetch_status_from_mock() {
    let client = spawn_mock(MockDevice::new(Some(11))).await;
    let snapshot = client.fetch_status().await.unwrap();

    assert_eq!(snapshot.param(ParamId::Threshold), Some(-25.0));
    assert_eq!(snapshot.param(ParamId::EchoTaps), Some(3.0));
    assert!(snapshot.flag(StatusFlag::MicEnabled));
    assert!(snapshot.level_dbfs().is_some());
}

#[tokio::test]
async fn test_non_finite_level_tokens_accepted() {
    let router = Router::new().route(
        "/api/status",
        get(|| async {
            r#"{"threshold_dbfs": -25.0, "lockout_sec": 2.0, "mic_enabled": false, "last_dbfs": -Infinity}"#
        }),
    );
    let addr = serve(router).await;
    let client = TelemetryClient::new(&format!("http://{addr}"), TIMEOUT).unwrap();

    let snapshot = client.fetch_status().await.unwrap();
    assert_eq!(snapshot.last_dbfs, None);
}

#[tokio::test]
async fn test_non_success_status_is_error() {
    let router = Router::new().route(
        "/api/status",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, r#"{"error": "backend down"}"#) }),
    );
    let addr = serve(router).await;
    let client = TelemetryClient::new(&format!("http://{addr}"), TIMEOUT).unwrap();

    match client.fetch_status().await {
        Err(ClientError::Status { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "backend down");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let router = Router::new().route(
        "/api/status",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "{}"
        }),
    );
    let addr = serve(router).await;
    let client = TelemetryClient::new(&format!("http://{addr}"), Duration::from_millis(100)).unwrap();

    let err = client.fetch_status().await.unwrap_err();
    assert!(err.is_transport(), "{err}");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = TelemetryClient::new(&format!("http://{addr}"), TIMEOUT).unwrap();

    assert!(client.fetch_status().await.unwrap_err().is_transport());
}

#[tokio::test]
async fn test_publish_updates_single_field() {
    let device = MockDevice::new(Some(11));
    let client = spawn_mock(device.clone()).await;

    let threshold = ParameterDefinition::builtin(ParamId::Threshold);
    client.publish(&ParameterUpdate::new(&threshold, -17.5)).await.unwrap();

    let taps = ParameterDefinition::builtin(ParamId::EchoTaps);
    client.publish(&ParameterUpdate::new(&taps, 6.0)).await.unwrap();

    let frame = ParameterDefinition::builtin(ParamId::EchoFrameDuration);
    client.publish(&ParameterUpdate::new(&frame, 2.5)).await.unwrap();

    let params = device.parameters();
    assert_eq!(params.threshold_dbfs, -17.5);
    assert_eq!(params.taps, 6);
    assert_eq!(params.frame_duration, 2.5);
    assert_eq!(params.lockout_sec, 2.0);
}

#[tokio::test]
async fn test_trigger_echo_rejected_while_locked_out() {
    let device = MockDevice::new(Some(11)).with_time_scale(10.0);
    let client = spawn_mock(device).await;

    assert_eq!(client.trigger_echo().await.unwrap(), "Echo triggered");
    match client.trigger_echo().await {
        Err(ClientError::Rejected(message)) => assert_eq!(message, "Mic is locked out"),
        other => panic!("expected rejection, got {other:?}"),
    }

    let snapshot = client.fetch_status().await.unwrap();
    assert!(snapshot.flag(StatusFlag::EchoActive));
    assert!(!snapshot.flag(StatusFlag::MicEnabled));
}

#[tokio::test]
async fn test_actuator_switch_through_facade() {
    let responder = MockResponder::bind("127.0.0.1:0").await.unwrap();
    let port = responder.local_addr().unwrap().port();
    tokio::spawn(responder.run());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let facade = Facade::new(CommandRelay::new(RelayTarget::new("127.0.0.1", port), Some(TIMEOUT)));
    tokio::spawn(facade.serve(listener, std::future::pending()));

    let client = ActuatorClient::new(&format!("http://{addr}"), TIMEOUT).unwrap();
    assert_eq!(client.switch(LedAction::On).await.unwrap(), "LED ON");
    assert_eq!(client.switch(LedAction::Off).await.unwrap(), "LED OFF");
}

#[tokio::test]
async fn test_actuator_relay_failure_surfaces_message() {
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = dead.local_addr().unwrap().port();
    drop(dead);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let facade = Facade::new(CommandRelay::new(RelayTarget::new("127.0.0.1", port), Some(TIMEOUT)));
    tokio::spawn(facade.serve(listener, std::future::pending()));

    let client = ActuatorClient::new(&format!("http://{addr}"), TIMEOUT).unwrap();
    match client.switch(LedAction::On).await {
        Err(ClientError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.starts_with("communication error"));
        }
        other => panic!("expected 500, got {other:?}"),
    }
}
