//! Line-oriented LED command responder.
//!
//! Stands in for the microcontroller behind the relay: each connection sends
//! one newline-terminated command, receives one reply and is closed by the
//! responder. No framing beyond the close.

use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// Reply for a single command line.
#[must_use]
pub fn reply_for(command: &str) -> &'static str {
    match command.trim() {
        "LED_ON" => "LED ON",
        "LED_OFF" => "LED OFF",
        _ => "ERR unknown command",
    }
}

/// TCP responder answering `LED_ON` / `LED_OFF`.
#[derive(Debug)]
pub struct MockResponder {
    listener: TcpListener,
    reply_delay: Duration,
    log: Arc<Mutex<Vec<String>>>,
}

impl MockResponder {
    /// Bind to `addr` (use port 0 for an ephemeral port).
    pub async fn bind(addr: &str) -> std::io::Result<Self> {
        Ok(Self {
            listener: TcpListener::bind(addr).await?,
            reply_delay: Duration::ZERO,
            log: Arc::default(),
        })
    }

    /// Wait this long before replying, to simulate a slow device.
    #[must_use]
    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    /// Bound address.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared log of received commands, in arrival order.
    #[must_use]
    pub fn command_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.log)
    }

    /// Accept connections until the listener fails.
    pub async fn run(self) -> std::io::Result<()> {
        tracing::info!(addr = ?self.listener.local_addr().ok(), "mock LED responder listening");
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let log = Arc::clone(&self.log);
            let delay = self.reply_delay;
            tokio::spawn(async move {
                if let Err(e) = handle(stream, delay, log).await {
                    tracing::warn!(%peer, error = %e, "responder connection failed");
                }
            });
        }
    }
}

async fn handle(
    stream: TcpStream,
    delay: Duration,
    log: Arc<Mutex<Vec<String>>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line).await?;
    let command = line.trim().to_string();
    let reply = reply_for(&command);
    tracing::debug!(%command, reply, "command received");
    log.lock().push(command);

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let mut stream = reader.into_inner();
    stream.write_all(reply.as_bytes()).await?;
    stream.write_all(b"\r\n").await?;
    stream.shutdown().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replies() {
        assert_eq!(reply_for("LED_ON\n"), "LED ON");
        assert_eq!(reply_for("LED_OFF"), "LED OFF");
        assert_eq!(reply_for("BLINK"), "ERR unknown command");
    }

    #[tokio::test]
    async fn test_one_reply_per_connection() {
        let responder = MockResponder::bind("127.0.0.1:0").await.unwrap();
        let addr = responder.local_addr().unwrap();
        let log = responder.command_log();
        tokio::spawn(responder.run());

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"LED_ON\n").await.unwrap();
        let mut reply = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut stream, &mut reply)
            .await
            .unwrap();
        assert_eq!(reply.trim(), "LED ON");
        assert_eq!(*log.lock(), vec!["LED_ON".to_string()]);
    }
}
