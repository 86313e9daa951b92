//! Unread-Scout: a streaming scrape engine for catalog unread lists
//!
//! This crate logs into a remote catalog over plain HTTP/1.x text, pages
//! through its unread listing and hand-extracts item records from the raw
//! reply bytes as they arrive. A second flow fetches an item's description
//! and best comments concurrently and renders them as one HTML fragment.

pub mod config;
pub mod extract;
pub mod output;
pub mod scrape;
pub mod session;
pub mod state;
pub mod transport;

use thiserror::Error;

/// Main error type for Unread-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task '{label}' panicked")]
    TaskPanicked { label: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Unread-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use output::{EventSink, ScoutEvent};
pub use scrape::Cookie;
pub use session::{Scout, TaskSupervisor};
pub use state::{ExcludeSet, Item, ItemList};
pub use transport::TransportError;
