//! Literal marker search and balanced tag extraction over raw bytes

/// Finds the first occurrence of `needle` starting at or after `from`
pub fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

/// Finds the last occurrence of `needle` starting at or before `before`
pub fn rfind(haystack: &[u8], needle: &[u8], before: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    let last_start = before.min(haystack.len() - needle.len());
    (0..=last_start)
        .rev()
        .find(|&pos| haystack[pos..].starts_with(needle))
}

/// Lazy forward scan for every occurrence of a marker
///
/// Created by [`find_all`]. Restartable: a new scan from any offset yields
/// the same positions past that offset.
#[derive(Debug, Clone)]
pub struct MarkerPositions<'a> {
    buffer: &'a [u8],
    marker: &'a [u8],
    next: usize,
}

impl Iterator for MarkerPositions<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let pos = find(self.buffer, self.marker, self.next)?;
        self.next = pos + 1;
        Some(pos)
    }
}

/// Returns every position of `marker` in `buffer` at or after `from`
///
/// # Example
///
/// ```
/// use unread_scout::extract::find_all;
///
/// let positions: Vec<usize> = find_all(b"ab-ab-ab", b"ab", 1).collect();
/// assert_eq!(positions, vec![3, 6]);
/// ```
pub fn find_all<'a>(buffer: &'a [u8], marker: &'a [u8], from: usize) -> MarkerPositions<'a> {
    MarkerPositions {
        buffer,
        marker,
        next: from,
    }
}

/// A slice of the buffer produced by [`extract_balanced`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    /// Extracted bytes
    pub bytes: &'a [u8],

    /// Where the next extraction should start searching
    pub end: usize,
}

/// Extracts the element opened by `open_tag`, matching nested elements
///
/// Finds `open_tag` at or after `from`, then walks every following `<`:
/// an opening of the same element raises the depth, its closing tag lowers
/// it, and the element ends when the depth returns to zero. With
/// `include_tag` the fragment spans the opening tag through the closing
/// `>`; otherwise it is the content between them.
///
/// The element name is `open_tag` up to its first space or `>`, so
/// `<p class="summary">` balances against every `<p ...>` and `</p>`.
///
/// Returns `None` when the opening tag or its balancing close is not in the
/// buffer yet.
///
/// # Example
///
/// ```
/// use unread_scout::extract::extract_balanced;
///
/// let html = br#"<p class="summary"><p class="summary">x</p>y</p>"#;
/// let fragment = extract_balanced(html, r#"<p class="summary">"#, 0, false).unwrap();
/// assert_eq!(fragment.bytes, br#"<p class="summary">x</p>y"#);
/// ```
pub fn extract_balanced<'a>(
    buffer: &'a [u8],
    open_tag: &str,
    from: usize,
    include_tag: bool,
) -> Option<Fragment<'a>> {
    let open_tag = open_tag.as_bytes();
    let begin = find(buffer, open_tag, from)?;

    let name_len = open_tag
        .iter()
        .position(|&b| b == b' ' || b == b'>')
        .unwrap_or(open_tag.len());
    let element = &open_tag[..name_len];
    if element.len() < 2 || element[0] != b'<' {
        return None;
    }
    let mut close_tag = Vec::with_capacity(name_len + 2);
    close_tag.extend_from_slice(b"</");
    close_tag.extend_from_slice(&element[1..]);
    close_tag.push(b'>');

    let mut close = begin;
    let mut depth = 1usize;
    while depth > 0 {
        close = find(buffer, b"<", close + 1)?;
        let rest = &buffer[close..];
        if rest.starts_with(&close_tag) {
            depth -= 1;
        } else if opens_element(rest, element) {
            depth += 1;
        }
    }

    if include_tag {
        let end = find(buffer, b">", close)? + 1;
        Some(Fragment {
            bytes: &buffer[begin..end],
            end,
        })
    } else {
        let content = find(buffer, b">", begin)? + 1;
        Some(Fragment {
            bytes: &buffer[content..close],
            end: close,
        })
    }
}

/// True if `rest` starts with `element` followed by a name boundary,
/// so `<p` does not match `<pre>`
fn opens_element(rest: &[u8], element: &[u8]) -> bool {
    rest.starts_with(element)
        && rest
            .get(element.len())
            .map_or(false, |&b| b == b'>' || b == b'/' || b.is_ascii_whitespace())
}
