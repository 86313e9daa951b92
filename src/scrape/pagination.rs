//! Pagination Controller
//!
//! Requests successive pages of the unread listing over one connection,
//! scanning each reply as it arrives, until enough items were discovered.

use crate::config::{placeholders, Config, MarkupConfig};
use crate::extract::{find_all, read_anchor, Anchor, AnchorMiss};
use crate::output::Notifier;
use crate::scrape::{Cookie, ReceiveBuffer};
use crate::state::ExcludeSet;
use crate::transport::connect;
use crate::ScoutError;
use std::collections::HashSet;
use std::fmt;

/// Where a listing run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationPhase {
    Idle,
    Requesting { page: u32 },
    Draining { page: u32 },
    Finished,
}

impl fmt::Display for PaginationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Requesting { page } => write!(f, "requesting page {}", page),
            Self::Draining { page } => write!(f, "draining page {}", page),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Outcome of one scan pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPass {
    /// Items reported by this pass
    pub emitted: usize,

    /// Where the next pass must start searching
    pub resume_at: usize,
}

/// Finds listing entries in a growing page buffer
///
/// Marker occurrences are handled at most once per page: a watermark
/// remembers the last occurrence already read. An entry whose anchor is
/// still incomplete stops the pass and becomes the resume point.
pub struct ListingScanner<'a> {
    markup: &'a MarkupConfig,
    exclude: &'a dyn ExcludeSet,
    desired_count: usize,
    discovered: usize,
    excluded: usize,
    read_through: Option<usize>,
    seen: Option<HashSet<u64>>,
}

impl<'a> ListingScanner<'a> {
    pub fn new(markup: &'a MarkupConfig, exclude: &'a dyn ExcludeSet, desired_count: usize) -> Self {
        Self {
            markup,
            exclude,
            desired_count,
            discovered: 0,
            excluded: 0,
            read_through: None,
            seen: None,
        }
    }

    /// Also skips ids already reported earlier in the run
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.seen = dedup.then(HashSet::new);
        self
    }

    /// Scans `bytes` from `from` and reports each new, non-excluded entry
    ///
    /// Stops as soon as the desired count is reached.
    pub fn scan(&mut self, bytes: &[u8], from: usize, mut on_item: impl FnMut(&Anchor)) -> ScanPass {
        let markup = self.markup;
        let marker = markup.listing_marker.as_bytes();
        let mut resume_at = bytes.len().saturating_sub(marker.len().saturating_sub(1));
        let mut emitted = 0;

        for pos in find_all(bytes, marker, from) {
            if self.is_satisfied() {
                break;
            }
            if self.read_through.map_or(false, |mark| pos <= mark) {
                continue;
            }

            let anchor = match read_anchor(bytes, pos, &markup.anchor_open) {
                Ok(anchor) => anchor,
                Err(AnchorMiss::Incomplete) => {
                    resume_at = resume_at.min(pos);
                    break;
                }
                Err(AnchorMiss::Malformed) => {
                    tracing::debug!("Listing marker at {} has no readable anchor", pos);
                    self.read_through = Some(pos);
                    continue;
                }
            };
            self.read_through = Some(pos);

            if self.exclude.contains(anchor.id) {
                tracing::trace!("Item {} is excluded", anchor.id);
                self.excluded += 1;
                continue;
            }
            if let Some(seen) = self.seen.as_mut() {
                if !seen.insert(anchor.id) {
                    continue;
                }
            }

            self.discovered += 1;
            emitted += 1;
            on_item(&anchor);
        }

        ScanPass { emitted, resume_at }
    }

    /// Forgets buffer positions before a new page is received
    pub fn start_page(&mut self) {
        self.read_through = None;
    }

    pub fn is_satisfied(&self) -> bool {
        self.discovered >= self.desired_count
    }

    pub fn discovered(&self) -> usize {
        self.discovered
    }

    pub fn excluded(&self) -> usize {
        self.excluded
    }
}

/// Totals of a finished listing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSummary {
    pub discovered: usize,
    pub excluded: usize,
    pub pages: u32,
}

/// Drives one listing run
pub struct Paginator<'a> {
    config: &'a Config,
    cookie: &'a Cookie,
    exclude: &'a dyn ExcludeSet,
    notifier: &'a Notifier,
    phase: PaginationPhase,
}

impl<'a> Paginator<'a> {
    pub fn new(
        config: &'a Config,
        cookie: &'a Cookie,
        exclude: &'a dyn ExcludeSet,
        notifier: &'a Notifier,
    ) -> Self {
        Self {
            config,
            cookie,
            exclude,
            notifier,
            phase: PaginationPhase::Idle,
        }
    }

    pub fn phase(&self) -> PaginationPhase {
        self.phase
    }

    fn enter(&mut self, phase: PaginationPhase) {
        tracing::debug!("Listing run: {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    /// Runs the listing until `desired-count` items were discovered
    ///
    /// Each page is requested on the same connection, reconnecting only
    /// after the server closed it, and drained until a receive brings no
    /// new bytes. Every discovered item is passed to `on_item`, then
    /// announced through the notifier.
    ///
    /// Without `max-pages` there is no page cap: a catalog that never lists
    /// enough unread items keeps this loop requesting pages.
    pub async fn run(&mut self, mut on_item: impl FnMut(&Anchor)) -> Result<PaginationSummary, ScoutError> {
        let config = self.config;
        let notifier = self.notifier;
        let unread = &config.unread;

        notifier.status("Unread: Starting");
        let request_base = unread.get.fill(placeholders::COOKIE, self.cookie);
        let mut scanner = ListingScanner::new(&config.markup, self.exclude, unread.desired_count)
            .with_dedup(unread.dedup_within_run);
        let mut buffer = ReceiveBuffer::new();
        let mut page = unread.start_page;
        let mut pages = 0u32;

        let mut conn = connect(&config.site.address, config.site.port, &config.transport).await?;

        while !scanner.is_satisfied() {
            if let Some(max_pages) = unread.max_pages {
                if pages >= max_pages {
                    tracing::warn!(
                        "Stopping after {} pages with {} of {} items",
                        pages,
                        scanner.discovered(),
                        unread.desired_count
                    );
                    break;
                }
            }

            self.enter(PaginationPhase::Requesting { page });
            notifier.status(format!("Unread: Page processing {}", page));

            if conn.is_closed() {
                tracing::debug!("{} closed the connection, reconnecting", conn.peer());
                conn = connect(&config.site.address, config.site.port, &config.transport).await?;
            }
            let request = request_base.fill(placeholders::PAGE_NUMBER, page);
            conn.send(request.as_str().as_bytes()).await?;

            self.enter(PaginationPhase::Draining { page });
            buffer.clear();
            scanner.start_page();
            let before = scanner.discovered();

            loop {
                let chunk = conn.receive().await?;
                if chunk.is_empty() {
                    break;
                }
                buffer.append(&chunk);

                let pass = scanner.scan(buffer.as_bytes(), buffer.scanned_offset(), |anchor| {
                    on_item(anchor);
                    notifier.item_discovered(anchor.id, &anchor.title);
                });
                buffer.settle(pass.resume_at);
                tracing::debug!(
                    "Page {}: {} bytes buffered, {} new items, scan resumes at {}",
                    page,
                    buffer.len(),
                    pass.emitted,
                    buffer.scanned_offset()
                );

                if scanner.is_satisfied() {
                    break;
                }
            }

            if scanner.discovered() == before {
                tracing::warn!("Page {} yielded no new unread items", page);
            }
            page = page.saturating_add(1);
            pages += 1;
        }

        self.enter(PaginationPhase::Finished);
        notifier.status(format!("Unread: OK, {} found", scanner.discovered()));

        Ok(PaginationSummary {
            discovered: scanner.discovered(),
            excluded: scanner.excluded(),
            pages,
        })
    }
}
