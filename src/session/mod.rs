//! Session module: task supervision and the engine facade
//!
//! `Scout` owns the configuration, the session cookie and the item list,
//! and runs every boundary operation as a supervised task. Shared session
//! state is only replaced after `TaskSupervisor::drain` has joined every
//! outstanding task.

mod scout;
mod supervisor;

pub use scout::Scout;
pub use supervisor::{DrainReport, TaskSupervisor};
