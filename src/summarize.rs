use tracing::{info, warn};

use crate::cache::CachedSummary;
use crate::error::{PagebriefError, Result};
use crate::messages::{fill, Locale};
use crate::model::{Message, ModelRequest};
use crate::normalize::{hash_content, truncate_chars};
use crate::pipeline::{RequestContext, Services};

/// Characters of page text sent to the model
pub const SUMMARY_INPUT_CHARS: usize = 10_000;

/// Characters of page text kept in the cache for follow-ups
pub const RAW_CONTENT_CHARS: usize = 5_000;

pub fn summary_prompt(title: &str, url: &str, content: &str, locale: Locale) -> String {
    fill(
        locale.messages().summary_prompt,
        &[("title", title), ("url", url), ("content", content)],
    )
}

/// Summarize already-extracted text and cache the result
pub fn summarize_content(
    services: &Services,
    ctx: &RequestContext,
    url: &str,
    title: &str,
    content: &str,
) -> Result<String> {
    let locale = services.config.locale;
    let truncated = truncate_chars(content, SUMMARY_INPUT_CHARS);

    let request = ModelRequest {
        max_tokens: services.config.model.summary_max_tokens,
        system: None,
        messages: vec![Message::user_text(summary_prompt(title, url, &truncated, locale))],
        tools: Vec::new(),
    };
    let response = services.model.complete(&request)?;
    let summary = response.text();
    if summary.trim().is_empty() {
        return Err(PagebriefError::ModelFailed("empty summary".into()));
    }
    info!("Summarized {} ({} chars in, {} chars out)", url, truncated.chars().count(), summary.chars().count());

    let entry = CachedSummary {
        title: Some(title.to_string()),
        summary: summary.clone(),
        content_hash: Some(hash_content(content)),
        raw_content: Some(truncate_chars(&truncated, RAW_CONTENT_CHARS)),
    };
    if let Err(e) = services.cache.put(&ctx.conversation_id, url, &entry) {
        warn!("Failed to cache summary for {}: {}", url, e);
    }

    Ok(summary)
}
