//! One-shot command relay over TCP.
//!
//! Every call opens a fresh connection, writes the command followed by `\n`,
//! then reads until the remote side closes. The accumulated bytes, decoded as
//! lossy UTF-8 and trimmed, are the reply. There is no framing beyond the
//! close, no pooling and no retry.
//!
//! Operations are independent: any number may be in flight at once, each on
//! its own connection. An optional deadline and a [`CancelHandle`] bound how
//! long one operation may hang.

use crate::error::{RelayError, Result};
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

/// Host and port of the command responder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTarget {
    /// Hostname or IP address
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl RelayTarget {
    /// Create a target.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for RelayTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Lifecycle of one relay operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandPhase {
    /// Connection not yet established.
    NotConnected,
    /// Connected; the command is being or has been written, nothing received yet.
    Written,
    /// At least one reply chunk received; waiting for close.
    Accumulating,
}

impl fmt::Display for CommandPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandPhase::NotConnected => f.write_str("not connected"),
            CommandPhase::Written => f.write_str("command written"),
            CommandPhase::Accumulating => f.write_str("accumulating response"),
        }
    }
}

/// Fires the paired [`CancelSignal`].
#[derive(Debug)]
pub struct CancelHandle(oneshot::Sender<()>);

impl CancelHandle {
    /// Cancel the operation holding the paired signal.
    pub fn cancel(self) {
        let _ = self.0.send(());
    }
}

/// Passed to [`CommandRelay::send_with_cancel`].
///
/// Dropping the [`CancelHandle`] without calling `cancel` does not cancel.
#[derive(Debug)]
pub struct CancelSignal(oneshot::Receiver<()>);

impl CancelSignal {
    async fn cancelled(self) {
        if self.0.await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Create a linked cancel handle and signal.
#[must_use]
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = oneshot::channel();
    (CancelHandle(tx), CancelSignal(rx))
}

enum Interrupt {
    Timeout(Duration),
    Cancelled,
}

/// Sends single commands to a line-oriented responder.
#[derive(Debug, Clone)]
pub struct CommandRelay {
    target: RelayTarget,
    timeout: Option<Duration>,
}

impl CommandRelay {
    /// Create a relay.
    ///
    /// # Arguments
    /// * `target` - Responder address
    /// * `timeout` - Deadline for the whole exchange; `None` waits forever
    #[must_use]
    pub fn new(target: RelayTarget, timeout: Option<Duration>) -> Self {
        Self { target, timeout }
    }

    /// Responder address.
    #[must_use]
    pub fn target(&self) -> &RelayTarget {
        &self.target
    }

    /// Send `command` and return the trimmed reply.
    pub async fn send(&self, command: &str) -> Result<String> {
        self.run(command, None).await
    }

    /// Like [`send`](Self::send), but rejects with [`RelayError::Cancelled`]
    /// once the paired [`CancelHandle`] fires.
    pub async fn send_with_cancel(&self, command: &str, cancel: CancelSignal) -> Result<String> {
        self.run(command, Some(cancel)).await
    }

    async fn run(&self, command: &str, cancel: Option<CancelSignal>) -> Result<String> {
        let mut phase = CommandPhase::NotConnected;
        let addr = self.target.to_string();
        tracing::debug!(responder = %addr, %command, "relaying command");

        let outcome = {
            let exchange = exchange(&addr, command, &mut phase);
            let deadline = async {
                match self.timeout {
                    Some(limit) => {
                        tokio::time::sleep(limit).await;
                        limit
                    }
                    None => std::future::pending().await,
                }
            };
            let cancelled = async {
                match cancel {
                    Some(signal) => signal.cancelled().await,
                    None => std::future::pending().await,
                }
            };
            tokio::select! {
                result = exchange => Ok(result),
                limit = deadline => Err(Interrupt::Timeout(limit)),
                () = cancelled => Err(Interrupt::Cancelled),
            }
        };

        match outcome {
            Ok(Ok(reply)) => {
                tracing::debug!(responder = %addr, %reply, "relay reply");
                Ok(reply)
            }
            Ok(Err(source)) if phase == CommandPhase::NotConnected => {
                tracing::warn!(responder = %addr, error = %source, "relay connect failed");
                Err(RelayError::Connect {
                    target: addr,
                    source,
                })
            }
            Ok(Err(source)) => Err(RelayError::Io { phase, source }),
            Err(Interrupt::Timeout(elapsed)) => {
                tracing::warn!(responder = %addr, %phase, ?elapsed, "relay timed out");
                Err(RelayError::Timeout { phase, elapsed })
            }
            Err(Interrupt::Cancelled) => {
                tracing::debug!(responder = %addr, %phase, "relay cancelled");
                Err(RelayError::Cancelled { phase })
            }
        }
    }
}

async fn exchange(addr: &str, command: &str, phase: &mut CommandPhase) -> std::io::Result<String> {
    let mut stream = TcpStream::connect(addr).await?;
    *phase = CommandPhase::Written;
    stream.write_all(format!("{command}\n").as_bytes()).await?;

    let mut received = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        *phase = CommandPhase::Accumulating;
        received.extend_from_slice(&chunk[..n]);
    }
    Ok(String::from_utf8_lossy(&received).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Responder that reads one line, writes `reply` in pieces and closes.
    async fn chunked_responder(pieces: &'static [&'static str]) -> RelayTarget {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            let _ = stream.read(&mut buf).await.unwrap();
            for piece in pieces {
                stream.write_all(piece.as_bytes()).await.unwrap();
                stream.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });
        RelayTarget::new("127.0.0.1", port)
    }

    #[tokio::test]
    async fn test_reply_accumulated_until_close() {
        let target = chunked_responder(&["  LED", " ON", "\r\n"]).await;
        let relay = CommandRelay::new(target, Some(Duration::from_secs(2)));
        assert_eq!(relay.send("LED_ON").await.unwrap(), "LED ON");
    }

    #[tokio::test]
    async fn test_without_deadline() {
        let target = chunked_responder(&["OK\n"]).await;
        let relay = CommandRelay::new(target, None);
        assert_eq!(relay.send("LED_OFF").await.unwrap(), "OK");
    }

    #[tokio::test]
    async fn test_reset_after_connect_is_not_a_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            // Leave part of the command unread so the close turns into a reset.
            let mut first = [0u8; 1];
            let _ = stream.read(&mut first).await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        });

        let relay = CommandRelay::new(RelayTarget::new("127.0.0.1", port), Some(Duration::from_secs(2)));
        match relay.send("LED_ON").await {
            Err(RelayError::Io { phase, .. }) => assert_ne!(phase, CommandPhase::NotConnected),
            other => panic!("expected transport error after connect, got {other:?}"),
        }
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(CommandPhase::Written.to_string(), "command written");
        assert_eq!(RelayTarget::new("10.0.0.2", 8080).to_string(), "10.0.0.2:8080");
    }
}
