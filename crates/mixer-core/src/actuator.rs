//! Actuator toggle actions shared by the relay façade and its clients.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Switch action accepted by `POST /api/led/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedAction {
    /// Turn the actuator on.
    On,
    /// Turn the actuator off.
    Off,
}

impl LedAction {
    /// Line command sent to the responder.
    #[must_use]
    pub fn command(&self) -> &'static str {
        match self {
            LedAction::On => "LED_ON",
            LedAction::Off => "LED_OFF",
        }
    }

    /// Path segment used by the façade.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LedAction::On => "on",
            LedAction::Off => "off",
        }
    }
}

impl fmt::Display for LedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned for anything other than `on` or `off`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid command: {0}")]
pub struct InvalidAction(pub String);

impl FromStr for LedAction {
    type Err = InvalidAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(LedAction::On),
            "off" => Ok(LedAction::Off),
            other => Err(InvalidAction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        assert_eq!("on".parse::<LedAction>(), Ok(LedAction::On));
        assert_eq!("off".parse::<LedAction>().map(|a| a.command()), Ok("LED_OFF"));
        assert_eq!(
            "ON".parse::<LedAction>(),
            Err(InvalidAction("ON".to_string()))
        );
        assert!("blink".parse::<LedAction>().is_err());
    }
}
