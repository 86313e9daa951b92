//! Fragment Extractor
//!
//! Side-effect-free functions over an accumulated reply buffer. They locate
//! literal markers, balance nested tags and slice fragments out of the raw
//! bytes without a markup parser. Every function treats a token that has
//! not arrived yet as "not found", so callers can retry after the next
//! receive.

mod detail;
mod listing;
mod search;

pub use detail::{extract_comments, extract_description};
pub use listing::{extract_anchor, read_anchor, Anchor, AnchorMiss};
pub use search::{extract_balanced, find, find_all, rfind, Fragment, MarkerPositions};
