//! Detail Fetcher: description and comments of one item, fetched in parallel

use crate::config::{placeholders, Config, Template};
use crate::extract::{extract_comments, extract_description};
use crate::output::Notifier;
use crate::scrape::{Cookie, ReceiveBuffer};
use crate::transport::{connect, Connection};
use crate::ScoutError;
use std::sync::Arc;

/// Fetches and renders the detail of item `id`
///
/// Description and comments are requested on two connections by two
/// independently spawned tasks, and both are joined before merging. The
/// merged text is the description, a link to the item page and the
/// comments; it is empty when no description was found, so the item can be
/// fetched again later.
///
/// The merged text is announced through the notifier even when a flow
/// failed; the failure is returned afterwards.
pub async fn fetch_detail(
    config: Arc<Config>,
    cookie: Cookie,
    id: u64,
    notifier: Notifier,
) -> Result<String, ScoutError> {
    let description = tokio::spawn(fetch_description(
        config.clone(),
        cookie.clone(),
        id,
        notifier.clone(),
    ));
    let comments = tokio::spawn(fetch_comments(config.clone(), cookie, id, notifier.clone()));

    let (description, comments) = tokio::join!(description, comments);
    let description = description.unwrap_or_else(|e| Err(joined_panic("description", e)));
    let comments = comments.unwrap_or_else(|e| Err(joined_panic("comments", e)));

    let detail = merge_detail(
        &config,
        id,
        description.as_ref().ok().and_then(Option::as_deref),
        comments.as_deref().unwrap_or_default(),
    );
    notifier.detail_ready(id, detail.clone());
    notifier.status("Detail: OK");

    description?;
    comments?;
    Ok(detail)
}

/// Joins description, item link and comments; empty without a description
pub fn merge_detail(config: &Config, id: u64, description: Option<&str>, comments: &str) -> String {
    let Some(description) = description else {
        return String::new();
    };

    let link = config.site.item_url.fill(placeholders::ITEM_ID, id);
    format!(
        "{}<a href=\"{}\">{}</a>{}",
        description, link, config.render.view_on_site_label, comments
    )
}

/// Receives until the description can be rendered
///
/// Returns `Ok(None)` when the reply stalls before the related-items
/// section appears.
async fn fetch_description(
    config: Arc<Config>,
    cookie: Cookie,
    id: u64,
    notifier: Notifier,
) -> Result<Option<String>, ScoutError> {
    notifier.status("Detail: Getting description");
    let mut conn = open_request(&config, &config.detail.description_get, &cookie, id).await?;

    let marker_len = config.markup.related_marker.len();
    let mut buffer = ReceiveBuffer::new();
    loop {
        let chunk = conn.receive().await?;
        if chunk.is_empty() {
            tracing::debug!("Description of {} not found in {} bytes", id, buffer.len());
            return Ok(None);
        }
        buffer.append(&chunk);

        if let Some(description) = extract_description(
            buffer.as_bytes(),
            buffer.scanned_offset(),
            &config.markup,
            &config.render,
        ) {
            notifier.status("Detail: Parsing description");
            return Ok(Some(description));
        }
        buffer.settle_with_margin(marker_len);
    }
}

/// Receives the whole comments reply, then renders it
async fn fetch_comments(
    config: Arc<Config>,
    cookie: Cookie,
    id: u64,
    notifier: Notifier,
) -> Result<String, ScoutError> {
    notifier.status("Detail: Getting comments");
    let mut conn = open_request(&config, &config.detail.comments_get, &cookie, id).await?;

    let mut buffer = ReceiveBuffer::new();
    loop {
        let chunk = conn.receive().await?;
        if chunk.is_empty() {
            break;
        }
        buffer.append(&chunk);
    }

    notifier.status("Detail: Parsing comments");
    Ok(extract_comments(buffer.as_bytes(), &config.markup, &config.render))
}

async fn open_request(
    config: &Config,
    template: &Template,
    cookie: &Cookie,
    id: u64,
) -> Result<Connection, ScoutError> {
    let request = template
        .fill(placeholders::ITEM_ID, id)
        .fill(placeholders::COOKIE, cookie);

    let mut conn = connect(&config.site.address, config.site.port, &config.transport).await?;
    conn.send(request.as_str().as_bytes()).await?;
    Ok(conn)
}

fn joined_panic(label: &str, error: tokio::task::JoinError) -> ScoutError {
    tracing::error!("Detail {} task failed: {}", label, error);
    ScoutError::TaskPanicked {
        label: format!("detail {}", label),
    }
}
