//! `mixer-core`
//!
//! Model of the echo mixer control panel, independent of any GUI toolkit or
//! transport.
//!
//! ## Modules
//!
//! - [`catalog`]: parameter definitions, domains, display formats and column layouts
//! - [`snapshot`]: the telemetry payload returned by `GET /api/status`
//! - [`widget`]: meter, slider, lamp and timer widgets with per-variant reconciliation
//! - [`panel`]: the [`ControlPanel`](panel::ControlPanel) owning all widgets, edit
//!   ownership and generation-tagged poll reconciliation
//! - [`publisher`]: single-field updates and the fire-and-forget [`UpdateSink`](publisher::UpdateSink)
//! - [`config`]: Figment-backed [`PanelConfig`](config::PanelConfig)
//! - [`actuator`]: on/off actions for the actuator-toggle façade
//!
//! ## Example
//!
//! ```rust
//! use mixer_core::catalog::{Layout, ParamId};
//! use mixer_core::panel::{ControlPanel, PollOutcome};
//! use mixer_core::snapshot::StatusSnapshot;
//!
//! let mut panel = ControlPanel::build(Layout::Standard, None);
//! let ticket = panel.begin_poll();
//! let snapshot = StatusSnapshot::from_json(
//!     r#"{"threshold_dbfs": -20, "lockout_sec": 1.5, "mic_enabled": true, "last_dbfs": -Infinity}"#,
//! )?;
//! panel.apply_poll(ticket.generation, PollOutcome::Snapshot(snapshot));
//! assert_eq!(panel.slider(ParamId::Threshold).map(|s| s.display.as_str()), Some("-20.0 dBFS"));
//! # Ok::<(), mixer_core::error::PanelError>(())
//! ```

pub mod actuator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod panel;
pub mod publisher;
pub mod snapshot;
pub mod widget;

pub use actuator::LedAction;
pub use catalog::{Catalog, Layout, ParamId, ParameterDefinition};
pub use config::PanelConfig;
pub use error::{ConfigError, PanelError};
pub use panel::{ApplyResult, ConnectionState, ControlPanel, PollOutcome, PollTicket};
pub use publisher::{ParameterUpdate, RecordingSink, UpdateSink};
pub use snapshot::StatusSnapshot;
pub use widget::{ControlWidget, WidgetId};
