//! State module for discovered items
//!
//! # Components
//!
//! - `Item` / `ItemList`: unread items found by the current listing run and
//!   their detail load state
//! - `ExcludeSet`: externally owned ids that discovery skips

mod exclude;
mod item;

// Re-export main types
pub use exclude::{ExcludeSet, NoExclusions};
pub use item::{DetailLookup, Item, ItemList};
