//! Configuration module for Unread-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use unread_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("unread-scout.toml")).unwrap();
//! println!("Catalog: {}:{}", config.site.address, config.site.port);
//! ```

mod parser;
mod template;
mod types;
mod validation;

// Re-export types
pub use template::Template;
pub use types::{
    AuthConfig, Config, DetailConfig, MarkupConfig, RenderConfig, SiteConfig, TransportConfig,
    UnreadConfig,
};

/// Placeholder names recognised in request templates
pub mod placeholders {
    pub use super::template::{CONTENT_LENGTH, COOKIE, ITEM_ID, LOGIN, PAGE_NUMBER, PASSWORD};
}

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, write_default_config,
    DEFAULT_CONFIG,
};
