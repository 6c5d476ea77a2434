//! `mixer-relay`
//!
//! Command relay for the remote actuator and the HTTP façade in front of it.
//!
//! - [`CommandRelay`]: one TCP connection per command, reply = everything
//!   received until the remote closes, with optional deadline and cancellation
//! - [`Facade`]: `POST /api/led/{on,off}` mapped onto relay operations
//!
//! ## Example
//!
//! ```rust,no_run
//! use mixer_relay::{CommandRelay, RelayTarget};
//! use std::time::Duration;
//!
//! # async fn example() -> mixer_relay::Result<()> {
//! let relay = CommandRelay::new(RelayTarget::new("192.168.1.123", 8080), Some(Duration::from_secs(5)));
//! let reply = relay.send("LED_ON").await?;
//! println!("device said: {reply}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod facade;
pub mod relay;

pub use error::{RelayError, Result};
pub use facade::Facade;
pub use mixer_core::LedAction;
pub use relay::{cancel_pair, CancelHandle, CancelSignal, CommandPhase, CommandRelay, RelayTarget};
