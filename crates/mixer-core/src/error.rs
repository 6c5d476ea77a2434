//! Core error types.

use crate::widget::WidgetId;
use thiserror::Error;

/// Errors raised by the panel model and snapshot decoding.
#[derive(Error, Debug)]
pub enum PanelError {
    /// Status body could not be decoded.
    #[error("Invalid status snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),

    /// No widget with this identity exists.
    #[error("Unknown widget: {0}")]
    UnknownWidget(WidgetId),

    /// The widget exists but cannot be edited.
    #[error("Widget {0} is not a slider")]
    NotASlider(WidgetId),
}

/// Errors raised while loading or validating [`crate::config::PanelConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Figment failed to merge or extract the configuration.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// The configuration loaded but holds an unusable value.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}
