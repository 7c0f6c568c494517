//! Edge events of Linux GPIO lines as a stream of timestamps.
//!
//! ```no_run
//! use lineevent::{Chip, Edge, EventLineConfig};
//!
//! # fn main() -> Result<(), lineevent::Error> {
//! let chip = Chip::open("/dev/gpiochip0")?;
//! let line = chip.request_events(&EventLineConfig::new(17).with_edge(Edge::Both).with_consumer("door"))?;
//! let events = line.events();
//! while let Ok(time) = events.recv() {
//!     println!("edge at {:?}, level now {}", time, line.value()?);
//! }
//! line.close()?;
//! # Ok(())
//! # }
//! ```

pub mod channel;
mod config;
mod error;
pub mod event;
mod line;
pub mod notifier;
mod session;
mod sys;

pub use crate::channel::{Closed, Receiver, RecvTimeoutError, Sender, TryRecvError};
pub use crate::config::{Edge, EventLineConfig};
pub use crate::error::{Error, Fault, Result};
pub use crate::line::{Chip, LineHandle, LineWithEvents};
pub use crate::notifier::{EdgeNotifier, Interest};
pub use crate::session::Session;
pub use lineevent_common::{v1, EventId};
