//! Relay operations against in-process responders.

use mixer_mock::MockResponder;
use mixer_relay::{cancel_pair, CommandPhase, CommandRelay, RelayError, RelayTarget};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Responder that reads the command, answers `OK` and closes.
async fn ok_responder() -> (RelayTarget, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 64];
        let n = stream.read(&mut buf).await.unwrap();
        stream.write_all(b"OK\n").await.unwrap();
        String::from_utf8_lossy(&buf[..n]).to_string()
    });
    (RelayTarget::new("127.0.0.1", port), handle)
}

/// Responder that accepts, optionally writes `partial`, then never closes.
async fn silent_responder(partial: &'static [u8]) -> RelayTarget {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        if !partial.is_empty() {
            stream.write_all(partial).await.unwrap();
        }
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(stream);
    });
    RelayTarget::new("127.0.0.1", port)
}

/// A port with nothing listening on it.
async fn closed_port() -> RelayTarget {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    RelayTarget::new("127.0.0.1", port)
}

#[tokio::test]
async fn test_round_trip_resolves_with_reply() {
    let (target, server) = ok_responder().await;
    let relay = CommandRelay::new(target, None);

    let reply = relay.send("LED_ON").await.unwrap();

    assert_eq!(reply, "OK");
    assert_eq!(server.await.unwrap(), "LED_ON\n");
}

#[tokio::test]
async fn test_connect_failure_rejects() {
    let relay = CommandRelay::new(closed_port().await, Some(Duration::from_secs(2)));
    let err = relay.send("LED_ON").await.unwrap_err();
    assert!(matches!(err, RelayError::Connect { .. }), "{err}");
    assert_eq!(err.phase(), CommandPhase::NotConnected);
}

#[tokio::test]
async fn test_timeout_reports_written_phase() {
    let relay = CommandRelay::new(silent_responder(b"").await, Some(Duration::from_millis(100)));
    let err = relay.send("LED_OFF").await.unwrap_err();
    match err {
        RelayError::Timeout { phase, elapsed } => {
            assert_eq!(phase, CommandPhase::Written);
            assert_eq!(elapsed, Duration::from_millis(100));
        }
        other => panic!("expected timeout, got {other}"),
    }
}

#[tokio::test]
async fn test_timeout_while_accumulating() {
    let relay = CommandRelay::new(silent_responder(b"LED").await, Some(Duration::from_millis(150)));
    let err = relay.send("LED_ON").await.unwrap_err();
    assert!(matches!(
        err,
        RelayError::Timeout {
            phase: CommandPhase::Accumulating,
            ..
        }
    ));
}

#[tokio::test]
async fn test_cancel_rejects_in_flight_operation() {
    let relay = CommandRelay::new(silent_responder(b"").await, None);
    let (handle, signal) = cancel_pair();

    let pending = tokio::spawn(async move { relay.send_with_cancel("LED_ON", signal).await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.cancel();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, RelayError::Cancelled { .. }), "{err}");
}

#[tokio::test]
async fn test_dropped_handle_does_not_cancel() {
    let (target, _server) = ok_responder().await;
    let relay = CommandRelay::new(target, Some(Duration::from_secs(2)));
    let (handle, signal) = cancel_pair();
    drop(handle);

    assert_eq!(relay.send_with_cancel("LED_ON", signal).await.unwrap(), "OK");
}

#[tokio::test]
async fn test_concurrent_operations_are_independent() {
    let responder = MockResponder::bind("127.0.0.1:0").await.unwrap();
    let port = responder.local_addr().unwrap().port();
    let log = responder.command_log();
    tokio::spawn(responder.run());

    let relay = CommandRelay::new(RelayTarget::new("127.0.0.1", port), Some(Duration::from_secs(2)));
    let (on, off, bad) = tokio::join!(relay.send("LED_ON"), relay.send("LED_OFF"), relay.send("BLINK"));

    assert_eq!(on.unwrap(), "LED ON");
    assert_eq!(off.unwrap(), "LED OFF");
    assert_eq!(bad.unwrap(), "ERR unknown command");
    assert_eq!(log.lock().len(), 3);
}
