use crate::config::template::Template;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Unread-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    pub auth: AuthConfig,
    pub unread: UnreadConfig,
    pub detail: DetailConfig,
    #[serde(default)]
    pub markup: MarkupConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Remote catalog address
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Host name or IP address of the catalog
    pub address: String,

    /// Plain HTTP port
    pub port: u16,

    /// Link to an item page, with `$id` substituted
    #[serde(rename = "item-url")]
    pub item_url: Template,
}

/// Receive pacing for every connection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Interval between polls of the available byte count (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Number of consecutive unchanged polls before a receive gives up
    #[serde(rename = "idle-polls")]
    pub idle_polls: u32,

    /// Receive buffer capacity; a receive returns as soon as this many bytes wait
    #[serde(rename = "receive-buffer")]
    pub receive_buffer: usize,

    /// Connection establishment timeout (milliseconds)
    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,
}

impl TransportConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            idle_polls: 10,
            receive_buffer: 64 * 1024,
            connect_timeout_ms: 10_000,
        }
    }
}

/// Login exchange templates and cookie markers
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Request line and headers; `$Content-Length` receives the body length
    pub get: Template,

    /// Form body; `$login` and `$password` receive the credentials
    pub post: Template,

    #[serde(rename = "user-id-marker")]
    pub user_id_marker: String,

    #[serde(rename = "user-hash-marker")]
    pub user_hash_marker: String,

    #[serde(rename = "session-marker")]
    pub session_marker: String,
}

impl AuthConfig {
    /// Cookie markers in the order their attributes are appended
    pub fn markers(&self) -> [&str; 3] {
        [
            &self.user_id_marker,
            &self.user_hash_marker,
            &self.session_marker,
        ]
    }
}

/// Unread listing pagination
#[derive(Debug, Clone, Deserialize)]
pub struct UnreadConfig {
    /// Listing request; `$Cookie` and `$pagenumber` are substituted
    pub get: Template,

    /// First page requested
    #[serde(rename = "start-page")]
    pub start_page: u32,

    /// Number of unread items wanted before the run stops
    #[serde(rename = "desired-count")]
    pub desired_count: usize,

    /// Optional cap on requested pages; unset means no cap
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,

    /// Skip ids already emitted earlier in the same run
    #[serde(rename = "dedup-within-run", default)]
    pub dedup_within_run: bool,
}

/// Item detail requests; `$id` and `$Cookie` are substituted
#[derive(Debug, Clone, Deserialize)]
pub struct DetailConfig {
    #[serde(rename = "description-get")]
    pub description_get: Template,

    #[serde(rename = "comments-get")]
    pub comments_get: Template,
}

/// Literal markers located in catalog replies
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Marks one unread entry in the listing
    #[serde(rename = "listing-marker")]
    pub listing_marker: String,

    /// Anchor preceding each listing marker; the item id follows it
    #[serde(rename = "anchor-open")]
    pub anchor_open: String,

    /// Section that follows the description; its presence completes the description
    #[serde(rename = "related-marker")]
    pub related_marker: String,

    #[serde(rename = "title-tag")]
    pub title_tag: String,

    #[serde(rename = "rating-tag")]
    pub rating_tag: String,

    #[serde(rename = "votes-tag")]
    pub votes_tag: String,

    #[serde(rename = "summary-tag")]
    pub summary_tag: String,

    /// Starts each comment block
    #[serde(rename = "comment-marker")]
    pub comment_marker: String,

    #[serde(rename = "comment-rating-tag")]
    pub comment_rating_tag: String,

    /// Opening of the comment body, without its closing `>`
    #[serde(rename = "comment-body-tag")]
    pub comment_body_tag: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            listing_marker: r#"data-rate="""#.to_string(),
            anchor_open: r#"<a href=""#.to_string(),
            related_marker: r#"data-content="Похожие книги">"#.to_string(),
            title_tag: r#"<span class="fn">"#.to_string(),
            rating_tag: r#"<span class="average">"#.to_string(),
            votes_tag: r#"<span class="votes">"#.to_string(),
            summary_tag: r#"<p class="summary">"#.to_string(),
            comment_marker: r#"<div class="m-comments-item-body">"#.to_string(),
            comment_rating_tag: r#"<span class="m-comments-rating">"#.to_string(),
            comment_body_tag: r#"<div class="m-comments-content""#.to_string(),
        }
    }
}

/// Labels used when rendering an item detail
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    #[serde(rename = "rating-label")]
    pub rating_label: String,

    #[serde(rename = "votes-label")]
    pub votes_label: String,

    #[serde(rename = "view-on-site-label")]
    pub view_on_site_label: String,

    #[serde(rename = "comment-separator")]
    pub comment_separator: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            rating_label: "Rating: ".to_string(),
            votes_label: "Votes: ".to_string(),
            view_on_site_label: "View on site".to_string(),
            comment_separator: "<hr><hr>".to_string(),
        }
    }
}
