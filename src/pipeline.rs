use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::{SqliteCache, SummaryCache};
use crate::config::Config;
use crate::error::Result;
use crate::escalation::{escalate, renderer_for, Renderer, StaticFallback};
use crate::extract::{extract_page, ExtractionResult};
use crate::fetch::{browser_headers, build_agent, Fetcher, HttpFetcher};
use crate::files::{FileAnalyzer, HttpFileAnalyzer};
use crate::model::{AnthropicModel, Model};
use crate::notify::{Messenger, TelegramMessenger};
use crate::router::{route, Notice, Route};
use crate::search::{DuckDuckGo, WebSearch};
use crate::summarize::summarize_content;

/// Process-wide collaborators, built once and shared by reference
pub struct Services {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher>,
    pub model: Arc<dyn Model>,
    pub cache: Arc<dyn SummaryCache>,
    /// None disables escalation
    pub renderer: Option<Arc<dyn Renderer>>,
    /// None disables progress notices
    pub messenger: Option<Arc<dyn Messenger>>,
    pub search: Arc<dyn WebSearch>,
    pub files: Arc<dyn FileAnalyzer>,
}

impl Services {
    /// Real collaborators for `config`, with the SQLite cache at its default path
    pub fn from_config(config: Config) -> Result<Self> {
        let cache = Arc::new(SqliteCache::open()?);
        Ok(Self::with_cache(config, cache))
    }

    pub fn with_cache(config: Config, cache: Arc<dyn SummaryCache>) -> Self {
        let timeouts = config.timeouts.clone();
        let locale = config.locale;
        Self {
            fetcher: Arc::new(HttpFetcher::new(build_agent(timeouts.fetch()))),
            model: Arc::new(AnthropicModel::new(config.model.clone(), timeouts.model())),
            cache,
            renderer: config
                .render
                .as_ref()
                .map(|target| renderer_for(target, timeouts.render())),
            messenger: config.telegram_bot_token.clone().map(|token| {
                Arc::new(TelegramMessenger::new(token, timeouts.notify())) as Arc<dyn Messenger>
            }),
            search: Arc::new(DuckDuckGo::new(locale, timeouts.search())),
            files: Arc::new(HttpFileAnalyzer::new(locale, timeouts.download())),
            config,
        }
    }

    pub fn escalation_available(&self) -> bool {
        self.renderer.is_some()
    }
}

/// Who a request is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Cache scope
    pub conversation_id: String,
    /// Where progress notices go, if anywhere
    pub chat_id: Option<String>,
}

impl RequestContext {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            chat_id: None,
        }
    }

    pub fn with_chat(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }
}

/// Fetch `url` and run extraction without summarizing
pub fn extract_url(services: &Services, url: &str) -> Result<ExtractionResult> {
    let body = services
        .fetcher
        .fetch(url, &browser_headers(), services.config.timeouts.fetch())?;
    let html = String::from_utf8_lossy(&body);
    info!("Fetched HTML: {} chars", html.chars().count());
    Ok(extract_page(&html))
}

/// Produce a summary (or a localized refusal) for `url`.
///
/// Cache hit, then fetch, extract, route and act. Never fails: every
/// failure ends in a cheaper path or a refusal string.
pub fn summarize_url(services: &Services, ctx: &RequestContext, url: &str) -> String {
    info!("Summarizing URL: {}", url);
    let m = services.config.locale.messages();

    match services.cache.get(&ctx.conversation_id, url) {
        Ok(Some(entry)) => {
            info!("Using cached summary for {}", url);
            return entry.summary;
        }
        Ok(None) => {}
        Err(e) => warn!("Cache lookup failed for {}: {}", url, e),
    }

    let extracted = match extract_url(services, url) {
        Ok(extracted) => extracted,
        Err(e) => {
            warn!("Static fetch failed for {}: {}", url, e);
            if services.escalation_available() {
                return escalate(services, ctx, url, Notice::Special, None);
            }
            return m.refuse_fetch_failed.to_string();
        }
    };

    let title = extracted.title.as_deref().unwrap_or(m.unknown_title);

    match route(&extracted, services.escalation_available(), services.config.locale) {
        Route::Summarize => summarize_content(services, ctx, url, title, &extracted.text)
            .unwrap_or_else(|e| {
                warn!("Summary failed for {}: {}", url, e);
                m.refuse_summary_failed.to_string()
            }),
        Route::Escalate(notice) => escalate(
            services,
            ctx,
            url,
            notice,
            Some(StaticFallback {
                title,
                text: &extracted.text,
            }),
        ),
        Route::Refuse(message) => message,
    }
}
