//! Relay error types.

use crate::relay::CommandPhase;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using RelayError.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Ways a relay operation can be rejected.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The connection could not be established.
    #[error("Connection to {target} failed: {source}")]
    Connect {
        /// `host:port` that was dialed.
        target: String,
        /// Underlying transport error.
        #[source]
        source: std::io::Error,
    },

    /// Transport failure after the connection was established.
    #[error("I/O error ({phase}): {source}")]
    Io {
        /// Phase reached when the error happened.
        phase: CommandPhase,
        /// Underlying transport error.
        #[source]
        source: std::io::Error,
    },

    /// The remote side did not close the connection in time.
    #[error("Timed out after {elapsed:?} ({phase})")]
    Timeout {
        /// Phase reached when the deadline passed.
        phase: CommandPhase,
        /// Configured deadline.
        elapsed: Duration,
    },

    /// The caller cancelled the operation.
    #[error("Command cancelled ({phase})")]
    Cancelled {
        /// Phase reached when the cancel arrived.
        phase: CommandPhase,
    },
}

impl RelayError {
    /// Phase the operation had reached when it was rejected.
    #[must_use]
    pub fn phase(&self) -> CommandPhase {
        match self {
            RelayError::Connect { .. } => CommandPhase::NotConnected,
            RelayError::Io { phase, .. }
            | RelayError::Timeout { phase, .. }
            | RelayError::Cancelled { phase } => *phase,
        }
    }
}
