use crate::config::template::{self, Template};
use crate::config::types::{AuthConfig, Config, DetailConfig, MarkupConfig, SiteConfig, TransportConfig, UnreadConfig};
use crate::ConfigError;

/// Smallest receive buffer accepted; every marker must fit comfortably
const MIN_RECEIVE_BUFFER: usize = 1024;

/// Validates the entire configuration
///
/// Missing keys are rejected earlier by deserialization. A placeholder that
/// a template does not contain is only logged, since sending the template
/// unchanged is still a well-formed request.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_transport_config(&config.transport)?;
    validate_auth_config(&config.auth)?;
    validate_unread_config(&config.unread)?;
    validate_detail_config(&config.detail)?;
    validate_markup_config(&config.markup)?;
    Ok(())
}

fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.address.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site address cannot be empty".to_string(),
        ));
    }

    if config.port == 0 {
        return Err(ConfigError::Validation(
            "site port must be between 1 and 65535".to_string(),
        ));
    }

    warn_missing_placeholder("site.item-url", &config.item_url, template::ITEM_ID);
    Ok(())
}

fn validate_transport_config(config: &TransportConfig) -> Result<(), ConfigError> {
    if config.poll_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "poll-interval-ms must be >= 1".to_string(),
        ));
    }

    if config.idle_polls == 0 {
        return Err(ConfigError::Validation("idle-polls must be >= 1".to_string()));
    }

    if config.receive_buffer < MIN_RECEIVE_BUFFER {
        return Err(ConfigError::Validation(format!(
            "receive-buffer must be >= {} bytes, got {}",
            MIN_RECEIVE_BUFFER, config.receive_buffer
        )));
    }

    Ok(())
}

fn validate_auth_config(config: &AuthConfig) -> Result<(), ConfigError> {
    require_template("auth.get", &config.get)?;
    require_template("auth.post", &config.post)?;

    for marker in config.markers() {
        if marker.is_empty() {
            return Err(ConfigError::Validation(
                "auth cookie markers cannot be empty".to_string(),
            ));
        }
    }

    warn_missing_placeholder("auth.post", &config.post, template::LOGIN);
    warn_missing_placeholder("auth.post", &config.post, template::PASSWORD);
    warn_missing_placeholder("auth.get", &config.get, template::CONTENT_LENGTH);
    Ok(())
}

fn validate_unread_config(config: &UnreadConfig) -> Result<(), ConfigError> {
    require_template("unread.get", &config.get)?;

    if config.desired_count == 0 {
        return Err(ConfigError::Validation(
            "desired-count must be >= 1".to_string(),
        ));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    // Without a page number every iteration re-requests the same page
    warn_missing_placeholder("unread.get", &config.get, template::PAGE_NUMBER);
    warn_missing_placeholder("unread.get", &config.get, template::COOKIE);
    Ok(())
}

fn validate_detail_config(config: &DetailConfig) -> Result<(), ConfigError> {
    require_template("detail.description-get", &config.description_get)?;
    require_template("detail.comments-get", &config.comments_get)?;

    warn_missing_placeholder("detail.description-get", &config.description_get, template::ITEM_ID);
    warn_missing_placeholder("detail.comments-get", &config.comments_get, template::ITEM_ID);
    Ok(())
}

fn validate_markup_config(config: &MarkupConfig) -> Result<(), ConfigError> {
    let markers = [
        ("listing-marker", &config.listing_marker),
        ("anchor-open", &config.anchor_open),
        ("related-marker", &config.related_marker),
        ("title-tag", &config.title_tag),
        ("rating-tag", &config.rating_tag),
        ("votes-tag", &config.votes_tag),
        ("summary-tag", &config.summary_tag),
        ("comment-marker", &config.comment_marker),
        ("comment-rating-tag", &config.comment_rating_tag),
        ("comment-body-tag", &config.comment_body_tag),
    ];

    for (name, marker) in markers {
        if marker.is_empty() {
            return Err(ConfigError::Validation(format!(
                "markup.{} cannot be empty",
                name
            )));
        }
    }

    // Balanced extraction derives the element name from these
    for (name, tag) in [
        ("title-tag", &config.title_tag),
        ("rating-tag", &config.rating_tag),
        ("votes-tag", &config.votes_tag),
        ("summary-tag", &config.summary_tag),
        ("comment-body-tag", &config.comment_body_tag),
    ] {
        if !tag.starts_with('<') || tag.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "markup.{} must start with an opening tag, got '{}'",
                name, tag
            )));
        }
    }

    Ok(())
}

fn require_template(name: &str, template: &Template) -> Result<(), ConfigError> {
    if template.as_str().trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} template cannot be empty",
            name
        )));
    }
    Ok(())
}

fn warn_missing_placeholder(name: &str, template: &Template, placeholder: &str) {
    if !template.has(placeholder) {
        tracing::warn!("{} template has no {} placeholder", name, placeholder);
    }
}
