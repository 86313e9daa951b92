//! Output module: notifications sent to the front end
//!
//! The engine never talks to a window or a terminal directly. It emits
//! [`ScoutEvent`]s into an [`EventSink`]; a front end drains them from a
//! channel, or a test collects them in memory.

mod events;
mod sink;

pub use events::ScoutEvent;
pub use sink::{ChannelSink, EventSink, MemorySink, Notifier};
