//! Scrape flows over the transport
//!
//! This module contains the three network flows of the engine:
//! - Login exchange that derives the session cookie
//! - Paged unread listing with incremental scanning
//! - Parallel description and comments fetch for one item

mod auth;
mod buffer;
mod detail;
mod pagination;

pub use auth::{authenticate, build_login_request, compose_cookie, Cookie, COOKIE_PREFIX};
pub use buffer::ReceiveBuffer;
pub use detail::{fetch_detail, merge_detail};
pub use pagination::{ListingScanner, PaginationPhase, PaginationSummary, Paginator, ScanPass};
