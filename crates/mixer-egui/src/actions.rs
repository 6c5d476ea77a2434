//! Toolbar actions: actuator switch and manual echo trigger.
//!
//! Each click spawns one request; the outcome comes back as an
//! [`ActionReport`] for the toolbar's status line.

use mixer_client::{ActuatorClient, TelemetryClient};
use mixer_core::LedAction;
use std::fmt;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// One toolbar button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// Switch the actuator through the façade.
    Actuator(LedAction),
    /// Start echo playback now.
    TriggerEcho,
}

impl PanelAction {
    /// Buttons in toolbar order.
    pub const ALL: [PanelAction; 3] = [
        PanelAction::Actuator(LedAction::On),
        PanelAction::Actuator(LedAction::Off),
        PanelAction::TriggerEcho,
    ];

    /// Button caption.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            PanelAction::Actuator(LedAction::On) => "LED ON",
            PanelAction::Actuator(LedAction::Off) => "LED OFF",
            PanelAction::TriggerEcho => "TRIGGER ECHO",
        }
    }
}

impl fmt::Display for PanelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one action.
#[derive(Debug, Clone)]
pub struct ActionReport {
    /// Action that ran.
    pub action: PanelAction,
    /// Reply text or error message.
    pub outcome: Result<String, String>,
    /// When the request finished.
    pub finished: Instant,
}

impl ActionReport {
    /// Whether the request succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// One-line text for the status line.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.outcome {
            Ok(reply) => format!("{}: {}", self.action, reply),
            Err(message) => format!("{} failed: {}", self.action, message),
        }
    }
}

/// Runs toolbar actions on the runtime.
pub struct ActionDispatcher {
    telemetry: TelemetryClient,
    actuator: Option<ActuatorClient>,
    pending: usize,
    tx: mpsc::Sender<ActionReport>,
    rx: mpsc::Receiver<ActionReport>,
}

impl ActionDispatcher {
    /// Create a dispatcher. Without an actuator client the LED buttons report
    /// an error instead of sending anything.
    #[must_use]
    pub fn new(telemetry: TelemetryClient, actuator: Option<ActuatorClient>) -> Self {
        let (tx, rx) = mpsc::channel(8);
        Self {
            telemetry,
            actuator,
            pending: 0,
            tx,
            rx,
        }
    }

    /// Requests still running.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Spawn the request behind `action`.
    pub fn dispatch(&mut self, action: PanelAction, handle: &Handle) {
        let telemetry = self.telemetry.clone();
        let actuator = self.actuator.clone();
        let tx = self.tx.clone();
        self.pending += 1;
        tracing::info!(%action, "panel action");

        handle.spawn(async move {
            let outcome = match action {
                PanelAction::Actuator(led) => match actuator {
                    Some(client) => client.switch(led).await.map_err(|e| e.to_string()),
                    None => Err("actuator façade not configured".to_string()),
                },
                PanelAction::TriggerEcho => telemetry.trigger_echo().await.map_err(|e| e.to_string()),
            };
            if let Err(message) = &outcome {
                tracing::warn!(%action, %message, "panel action failed");
            }
            let report = ActionReport {
                action,
                outcome,
                finished: Instant::now(),
            };
            let _ = tx.send(report).await;
        });
    }

    /// Collect finished actions, returning the most recent one.
    pub fn drain(&mut self) -> Option<ActionReport> {
        let mut latest = None;
        while let Ok(report) = self.rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            latest = Some(report);
        }
        latest
    }
}
