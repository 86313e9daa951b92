//! Auth Session: one login exchange that yields the session cookie

use crate::config::{placeholders, AuthConfig, Config};
use crate::extract::find;
use crate::output::Notifier;
use crate::transport::connect;
use crate::ScoutError;
use std::fmt;

/// Header name every cookie starts with
pub const COOKIE_PREFIX: &str = "Cookie:";

/// Cookie header line sent with every catalog request
///
/// Holds the bare prefix when the login reply carried none of the markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie(String);

impl Cookie {
    /// The bare `Cookie:` prefix
    pub fn empty() -> Self {
        Self(COOKIE_PREFIX.to_string())
    }

    /// Wraps an already formatted header line
    pub fn from_header(header: impl Into<String>) -> Self {
        Self(header.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of `name=value;` attributes in the header
    pub fn attributes(&self) -> usize {
        self.0
            .strip_prefix(COOKIE_PREFIX)
            .unwrap_or(&self.0)
            .split(';')
            .filter(|part| !part.trim().is_empty())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes() == 0
    }

    fn append_attribute(&mut self, attribute: &[u8]) {
        self.0.push(' ');
        self.0.push_str(&String::from_utf8_lossy(attribute));
    }
}

impl Default for Cookie {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the login request: header template followed by the form body
///
/// `$login` and `$password` go into the body, whose byte length replaces
/// `$Content-Length` in the header.
pub fn build_login_request(auth: &AuthConfig, login: &str, password: &str) -> Vec<u8> {
    let body = auth
        .post
        .fill(placeholders::LOGIN, login)
        .fill(placeholders::PASSWORD, password);
    let header = auth.get.fill(placeholders::CONTENT_LENGTH, body.len());

    let mut request = header.into_bytes();
    request.extend_from_slice(body.as_str().as_bytes());
    request
}

/// Derives the cookie from a login reply
///
/// For each marker found in the reply, the text from the marker through
/// the next `;` is appended after a space. Markers that are missing, or
/// not terminated by `;`, add nothing.
///
/// # Example
///
/// ```
/// use unread_scout::scrape::compose_cookie;
///
/// let reply = b"HTTP/1.1 302 Found\r\nSet-Cookie: user_id=42; path=/\r\n\r\n";
/// let cookie = compose_cookie(reply, &["user_id=", "user_hash=", "PHPSESSID="]);
/// assert_eq!(cookie.as_str(), "Cookie: user_id=42;");
/// ```
pub fn compose_cookie(reply: &[u8], markers: &[&str]) -> Cookie {
    let mut cookie = Cookie::empty();
    for marker in markers {
        let Some(begin) = find(reply, marker.as_bytes(), 0) else {
            tracing::debug!("Cookie marker {} not in reply", marker);
            continue;
        };
        if let Some(end) = find(reply, b";", begin) {
            cookie.append_attribute(&reply[begin..=end]);
        }
    }
    cookie
}

/// Logs in and returns the session cookie
///
/// Sends the login request and performs exactly one receive; the reply is
/// expected to fit in it. Missing markers are not an error, the cookie just
/// carries fewer attributes.
pub async fn authenticate(
    config: &Config,
    login: &str,
    password: &str,
    notifier: &Notifier,
) -> Result<Cookie, ScoutError> {
    notifier.status("Authorize: Starting");
    let request = build_login_request(&config.auth, login, password);

    notifier.status("Authorize: Connecting");
    let mut conn = connect(&config.site.address, config.site.port, &config.transport).await?;
    conn.send(&request).await?;
    let reply = conn.receive().await?;
    tracing::debug!("Login reply: {} bytes", reply.len());

    notifier.status("Authorize: Parsing reply");
    let cookie = compose_cookie(&reply, &config.auth.markers());
    if cookie.is_empty() {
        tracing::warn!("Login reply carried none of the cookie markers");
    }

    notifier.status("Authorize: OK");
    Ok(cookie)
}
