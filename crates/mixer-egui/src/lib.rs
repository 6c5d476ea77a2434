//! Echo mixer control panel.
//!
//! egui front end over [`mixer_core::ControlPanel`]. All network traffic runs
//! on a tokio runtime owned by [`app::MixerApp`]; results come back over mpsc
//! channels and are applied on the UI thread once per frame.

pub mod actions;
pub mod app;
pub mod layout;
pub mod poller;
pub mod publisher;
pub mod widgets;

pub use actions::{ActionDispatcher, ActionReport, PanelAction};
pub use app::MixerApp;
pub use poller::StatusPoller;
pub use publisher::SpawnedPublisher;
