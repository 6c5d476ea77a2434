//! Mock collaborators for local development.
//!
//! Serves the simulated audio service and the LED command responder side by
//! side, so `mixer-gui` and `mixer-relay` can run without hardware.
//!
//! ```bash
//! mixer-mock --http 127.0.0.1:5000 --tcp 127.0.0.1:8080
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use mixer_mock::{MockDevice, MockMonitor, MockResponder};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "mixer-mock")]
#[command(about = "Simulated audio service and LED responder", long_about = None)]
struct Cli {
    /// Address for the simulated audio service
    #[arg(long, default_value = "127.0.0.1:5000")]
    http: String,

    /// Address for the LED command responder
    #[arg(long, default_value = "127.0.0.1:8080")]
    tcp: String,

    /// Seed for the simulated level noise
    #[arg(long)]
    seed: Option<u64>,

    /// Centre of the simulated input level; above the threshold it triggers echoes
    #[arg(long, default_value_t = mixer_mock::device::NOISE_CENTER_DBFS, allow_hyphen_values = true)]
    noise_dbfs: f64,

    /// Delay before each LED reply, in milliseconds
    #[arg(long, default_value = "0")]
    reply_delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let listener = TcpListener::bind(&cli.http)
        .await
        .with_context(|| format!("Failed to bind audio service on {}", cli.http))?;
    let monitor = MockMonitor::new(MockDevice::new(cli.seed).with_noise_center(cli.noise_dbfs));

    let responder = MockResponder::bind(&cli.tcp)
        .await
        .with_context(|| format!("Failed to bind LED responder on {}", cli.tcp))?
        .with_reply_delay(std::time::Duration::from_millis(cli.reply_delay_ms));

    tracing::info!(http = %cli.http, tcp = %cli.tcp, "mock collaborators starting");

    tokio::select! {
        result = monitor.serve(listener) => result.context("Audio service stopped")?,
        result = responder.run() => result.context("LED responder stopped")?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown requested"),
    }
    Ok(())
}
