//! Request templates with `$name` placeholders
//!
//! Requests are plain text built by literal substitution. Only the first
//! occurrence of a placeholder is replaced, and a placeholder missing from
//! the template leaves it unchanged.

use serde::Deserialize;
use std::fmt;

/// Placeholder for the login in the auth POST body
pub const LOGIN: &str = "$login";

/// Placeholder for the password in the auth POST body
pub const PASSWORD: &str = "$password";

/// Placeholder for the POST body length in the auth GET header
pub const CONTENT_LENGTH: &str = "$Content-Length";

/// Placeholder for the session cookie header line
pub const COOKIE: &str = "$Cookie";

/// Placeholder for the listing page number
pub const PAGE_NUMBER: &str = "$pagenumber";

/// Placeholder for an item id
pub const ITEM_ID: &str = "$id";

/// A request template loaded from configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Template(String);

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns true if the template contains `placeholder`
    pub fn has(&self, placeholder: &str) -> bool {
        self.0.contains(placeholder)
    }

    /// Replaces the first occurrence of `placeholder` with `value`
    ///
    /// # Example
    ///
    /// ```
    /// use unread_scout::config::Template;
    ///
    /// let t = Template::new("GET /element/$id/ HTTP/1.1\r\n\r\n");
    /// assert_eq!(t.fill("$id", 42).as_str(), "GET /element/42/ HTTP/1.1\r\n\r\n");
    /// ```
    pub fn fill(&self, placeholder: &str, value: impl fmt::Display) -> Template {
        Template(self.0.replacen(placeholder, &value.to_string(), 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_bytes()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
