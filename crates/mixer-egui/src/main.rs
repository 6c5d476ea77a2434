//! Echo mixer control panel - egui desktop application
//!
//! # Usage
//!
//! ```bash
//! mixer-gui
//! mixer-gui --config mixer.toml --layout extended
//! mixer-gui --telemetry-url http://192.168.1.50:5000 --facade-url http://192.168.1.50:3000
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use mixer_core::{Layout, PanelConfig};
use mixer_egui::MixerApp;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Standard,
    Extended,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Standard => Layout::Standard,
            LayoutArg::Extended => Layout::Extended,
        }
    }
}

#[derive(Parser)]
#[command(name = "mixer-gui")]
#[command(about = "Echo mixer control panel", long_about = None)]
struct Cli {
    /// Configuration file (TOML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Audio service URL (overrides telemetry.base_url)
    #[arg(long)]
    telemetry_url: Option<String>,

    /// Actuator façade URL (overrides facade_url)
    #[arg(long)]
    facade_url: Option<String>,

    /// Panel layout (overrides layout)
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = PanelConfig::extract(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = cli.telemetry_url {
        config.telemetry.base_url = url;
    }
    if let Some(url) = cli.facade_url {
        config.facade_url = url;
    }
    if let Some(layout) = cli.layout {
        config.layout = layout.into();
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

    tracing::info!(
        url = %config.telemetry.base_url,
        layout = ?config.layout,
        "Starting echo mixer panel"
    );

    let app = MixerApp::new(&config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 420.0])
            .with_min_inner_size([640.0, 360.0])
            .with_title("Echo Mixer"),
        ..Default::default()
    };

    eframe::run_native(
        "Echo Mixer",
        options,
        Box::new(move |cc| {
            MixerApp::install_style(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("GUI failed: {e}"))
}
