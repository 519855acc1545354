//! Block polling engine.
//!
//! - `engine`: the generic [`Monitor`] that runs a [`BatchSource`] and fans its items out to
//!   subscribers
//! - `confirmation`: the confirmation-depth [`BatchSource`] over a [`ChainEventSource`]

mod confirmation;
mod engine;
mod error;

pub use confirmation::{
	confirmed_boundary, confirmed_range, events_after, ChainEventSource, ConfirmationMonitor,
	DEFAULT_POLL_INTERVAL,
};
pub use engine::{shutdown_requested, unless_shutdown, BatchSource, Monitor};
pub use error::MonitorError;
