//! Listing entries: item id and title from the anchor before a marker

use crate::extract::search::{find, rfind};

/// An item reference read from a listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub id: u64,
    pub title: String,
}

/// Why an anchor could not be read at a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorMiss {
    /// A required token is not in the buffer yet; retry after more bytes
    Incomplete,

    /// No anchor or no id precedes the marker; retrying will not help
    Malformed,
}

/// Reads the anchor preceding the marker at `marker_pos`
///
/// Scans backward to the nearest `anchor_open`, reads the first run of
/// digits after it as the id, then takes the text between the next `>` and
/// the following `<`, trimmed, as the title.
pub fn read_anchor(buffer: &[u8], marker_pos: usize, anchor_open: &str) -> Result<Anchor, AnchorMiss> {
    let anchor = rfind(buffer, anchor_open.as_bytes(), marker_pos).ok_or(AnchorMiss::Malformed)?;

    let digits_start = (anchor + 1..marker_pos)
        .find(|&pos| buffer[pos].is_ascii_digit())
        .ok_or(AnchorMiss::Malformed)?;
    let digits_len = buffer[digits_start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    let id = std::str::from_utf8(&buffer[digits_start..digits_start + digits_len])
        .ok()
        .and_then(|digits| digits.parse::<u64>().ok())
        .ok_or(AnchorMiss::Malformed)?;

    let title_start = find(buffer, b">", digits_start).ok_or(AnchorMiss::Incomplete)? + 1;
    let title_end = find(buffer, b"<", title_start).ok_or(AnchorMiss::Incomplete)?;
    let title = trim_spaces(&buffer[title_start..title_end]);

    Ok(Anchor {
        id,
        title: String::from_utf8_lossy(title).into_owned(),
    })
}

fn trim_spaces(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |pos| pos + 1);
    &bytes[start..end]
}

/// Extracts `(id, title)` for the listing marker at `marker_pos`
///
/// Returns `None` when any required token is missing from the buffer.
/// Extraction is idempotent, so the caller may retry from the same marker
/// once more bytes arrived.
///
/// # Example
///
/// ```
/// use unread_scout::extract::{extract_anchor, find};
///
/// let html = br#"<a href="/element/101/">  Dune </a><span data-rate=""></span>"#;
/// let marker = find(html, br#"data-rate="""#, 0).unwrap();
/// let anchor = extract_anchor(html, marker, r#"<a href=""#).unwrap();
/// assert_eq!((anchor.id, anchor.title.as_str()), (101, "Dune"));
/// ```
pub fn extract_anchor(buffer: &[u8], marker_pos: usize, anchor_open: &str) -> Option<Anchor> {
    read_anchor(buffer, marker_pos, anchor_open).ok()
}
