//! Actuator-toggle façade daemon.
//!
//! Listens for `POST /api/led/{on,off}` and relays `LED_ON` / `LED_OFF` to
//! the command responder, one TCP connection per request.
//!
//! # Usage
//!
//! ```bash
//! mixer-relay --config mixer.toml
//! mixer-relay --listen 0.0.0.0:3000 --target-host 192.168.1.123 --target-port 8080
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use mixer_core::PanelConfig;
use mixer_relay::{CommandRelay, Facade, RelayTarget};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mixer-relay")]
#[command(about = "HTTP façade relaying LED commands over TCP", long_about = None)]
struct Cli {
    /// Configuration file (TOML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides relay.listen)
    #[arg(long)]
    listen: Option<String>,

    /// Command responder host (overrides relay.host)
    #[arg(long)]
    target_host: Option<String>,

    /// Command responder port (overrides relay.port)
    #[arg(long)]
    target_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = PanelConfig::extract(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(listen) = cli.listen {
        config.relay.listen = listen;
    }
    if let Some(host) = cli.target_host {
        config.relay.host = host;
    }
    if let Some(port) = cli.target_port {
        config.relay.port = port;
    }
    config.validate().context("Invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                config
                    .log_level
                    .parse()
                    .context("Invalid log_level directive")?,
            ),
        )
        .init();
    tracing::debug!(?config, "configuration loaded");

    let relay = CommandRelay::new(
        RelayTarget::new(config.relay.host.clone(), config.relay.port),
        config.relay_timeout(),
    );
    let listener = TcpListener::bind(&config.relay.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.relay.listen))?;

    Facade::new(relay)
        .serve(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown requested");
        })
        .await
        .context("Façade server failed")?;

    Ok(())
}
