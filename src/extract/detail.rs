//! Item detail rendering: description block and best comments

use crate::config::{MarkupConfig, RenderConfig};
use crate::extract::search::{extract_balanced, find, rfind};

/// Renders the item description once the section after it has arrived
///
/// Searches for the related-items marker from `from`, then for the title
/// element before it, and assembles title, rating, vote count and summary.
/// Each piece is extracted after the previous one. Returns `None` while the
/// related-items marker is not in the buffer; a piece missing before it is
/// rendered empty.
pub fn extract_description(
    buffer: &[u8],
    from: usize,
    markup: &MarkupConfig,
    render: &RenderConfig,
) -> Option<String> {
    let related = find(buffer, markup.related_marker.as_bytes(), from)?;
    let mut cursor = rfind(buffer, markup.title_tag.as_bytes(), related)?;

    let mut out = Vec::new();
    out.extend_from_slice(b"<center><h1>");
    append_balanced(&mut out, buffer, &markup.title_tag, &mut cursor, false);
    out.extend_from_slice(b"</h1></center>");

    out.extend_from_slice(render.rating_label.as_bytes());
    append_balanced(&mut out, buffer, &markup.rating_tag, &mut cursor, false);
    out.extend_from_slice(b"<br>");

    out.extend_from_slice(render.votes_label.as_bytes());
    append_balanced(&mut out, buffer, &markup.votes_tag, &mut cursor, false);
    out.extend_from_slice(b"<br>");

    append_balanced(&mut out, buffer, &markup.summary_tag, &mut cursor, true);
    out.extend_from_slice(b"<br>");

    Some(String::from_utf8_lossy(&out).into_owned())
}

/// Renders every comment block in the buffer
///
/// Each block becomes the separator, an optional numeric rating and the
/// comment body in a blockquote. Returns an empty string when the buffer
/// holds no comment blocks.
pub fn extract_comments(buffer: &[u8], markup: &MarkupConfig, render: &RenderConfig) -> String {
    let marker = markup.comment_marker.as_bytes();
    let body_tag = markup.comment_body_tag.as_bytes();
    let mut out = Vec::new();

    let mut block = find(buffer, marker, 0);
    while let Some(block_pos) = block {
        let block_end = find(buffer, marker, block_pos + 1).unwrap_or(buffer.len());
        let mut cursor = block_pos;

        out.extend_from_slice(render.comment_separator.as_bytes());

        if let Some((digits, end)) = read_rating(buffer, &markup.comment_rating_tag, block_pos, block_end) {
            out.extend_from_slice(render.rating_label.as_bytes());
            out.extend_from_slice(digits);
            out.extend_from_slice(b"<br>");
            cursor = end;
        }

        out.extend_from_slice(b"<blockquote>");
        if find(buffer, body_tag, cursor).map_or(false, |pos| pos < block_end) {
            append_balanced(&mut out, buffer, &markup.comment_body_tag, &mut cursor, false);
        }
        out.extend_from_slice(b"</blockquote>");

        block = find(buffer, marker, cursor.max(block_pos + 1));
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Reads the digits following the rating tag inside `[from, until)`
fn read_rating<'a>(buffer: &'a [u8], rating_tag: &str, from: usize, until: usize) -> Option<(&'a [u8], usize)> {
    let tag = find(buffer, rating_tag.as_bytes(), from).filter(|&pos| pos < until)?;
    let start = (tag + rating_tag.len()..until).find(|&pos| buffer[pos].is_ascii_digit())?;
    let len = buffer[start..until]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    Some((&buffer[start..start + len], start + len))
}

fn append_balanced(out: &mut Vec<u8>, buffer: &[u8], tag: &str, cursor: &mut usize, include_tag: bool) {
    if let Some(fragment) = extract_balanced(buffer, tag, *cursor, include_tag) {
        out.extend_from_slice(fragment.bytes);
        *cursor = fragment.end;
    }
}
