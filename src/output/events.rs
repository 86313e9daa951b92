use crate::scrape::Cookie;
use std::fmt;

/// A notification from the engine to its front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoutEvent {
    /// A status line for the status bar and the log
    Status(String),

    /// A listing run found an unread item
    ItemDiscovered { id: u64, title: String },

    /// An item detail finished loading; an empty text means nothing was found
    DetailReady { id: u64, text: String },

    /// Login produced a cookie; apply it with `Scout::update_cookie`
    CookieReady(Cookie),
}

impl ScoutEvent {
    pub fn status(text: impl Into<String>) -> Self {
        Self::Status(text.into())
    }
}

impl fmt::Display for ScoutEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(text) => write!(f, "{}", text),
            Self::ItemDiscovered { id, title } => write!(f, "Found {} ({})", title, id),
            Self::DetailReady { id, text } => write!(f, "Detail for {} ({} bytes)", id, text.len()),
            Self::CookieReady(cookie) => {
                write!(f, "Cookie ready ({} attributes)", cookie.attributes())
            }
        }
    }
}
