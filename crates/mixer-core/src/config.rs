//! Configuration using Figment
//!
//! [`PanelConfig`] is assembled from, in increasing priority:
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. environment variables prefixed with `MIXER_` (`__` separates sections,
//!    e.g. `MIXER_TELEMETRY__POLL_INTERVAL_MS=250`)
//!
//! # Example
//! ```no_run
//! use mixer_core::config::PanelConfig;
//!
//! let config = PanelConfig::load(Some("mixer.toml".as_ref()))?;
//! println!("Polling {}", config.telemetry.base_url);
//! # Ok::<(), mixer_core::error::ConfigError>(())
//! ```

use crate::catalog::Layout;
use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "MIXER_";

/// Top-level configuration shared by the panel, relay and mock binaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Telemetry/control endpoint settings
    pub telemetry: TelemetryConfig,
    /// Which panel layout to build
    pub layout: Layout,
    /// Command relay settings
    pub relay: RelayConfig,
    /// Base URL of the actuator-toggle façade
    pub facade_url: String,
    /// Default tracing directive (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Telemetry endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Base URL serving `/api/status` and the update endpoints
    pub base_url: String,
    /// Poll cadence in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

/// Command relay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Command responder host
    pub host: String,
    /// Command responder port
    pub port: u16,
    /// Per-command timeout in milliseconds (0 disables the timeout)
    #[serde(default = "default_relay_timeout")]
    pub timeout_ms: u64,
    /// Address the façade listens on
    pub listen: String,
}

fn default_poll_interval() -> u64 {
    600
}

fn default_request_timeout() -> u64 {
    2000
}

fn default_relay_timeout() -> u64 {
    5000
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_ms: default_poll_interval(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            timeout_ms: default_relay_timeout(),
            listen: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            telemetry: TelemetryConfig::default(),
            layout: Layout::default(),
            relay: RelayConfig::default(),
            facade_url: "http://127.0.0.1:3000".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl PanelConfig {
    /// Figment with defaults, the optional TOML file and `MIXER_` overrides.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(PanelConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Merge defaults, file and environment without validating.
    ///
    /// Binaries apply their command-line overrides to the result and call
    /// [`validate`](Self::validate) once afterwards.
    pub fn extract(path: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self::figment(path).extract()?)
    }

    /// Load and validate configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = Self::extract(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telemetry.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "telemetry.poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.telemetry.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "telemetry.base_url must not be empty".to_string(),
            ));
        }
        if self.relay.host.trim().is_empty() {
            return Err(ConfigError::Invalid("relay.host must not be empty".to_string()));
        }
        if self.relay.port == 0 {
            return Err(ConfigError::Invalid("relay.port must not be 0".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }

    /// Poll cadence.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry.poll_interval_ms)
    }

    /// Per-request telemetry timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.telemetry.request_timeout_ms)
    }

    /// Relay command timeout, `None` when disabled.
    #[must_use]
    pub fn relay_timeout(&self) -> Option<Duration> {
        (self.relay.timeout_ms > 0).then(|| Duration::from_millis(self.relay.timeout_ms))
    }
}
