//! In-process collaborators for integration tests. Every fake counts calls.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use pagebrief::cache::{MemoryCache, SummaryCache};
use pagebrief::config::Config;
use pagebrief::error::{PagebriefError, Result};
use pagebrief::escalation::Renderer;
use pagebrief::fetch::Fetcher;
use pagebrief::files::FileAnalyzer;
use pagebrief::model::{ContentBlock, Model, ModelRequest, ModelResponse};
use pagebrief::notify::Messenger;
use pagebrief::pipeline::Services;
use pagebrief::search::WebSearch;
use pagebrief::tools::ToolOutput;

/// Serves canned HTML per URL; unknown URLs fail like a dead host
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn with_page(url: &str, html: &str) -> Self {
        let mut fetcher = Self::default();
        fetcher.pages.insert(url.to_string(), html.to_string());
        fetcher
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, url: &str, _headers: &HashMap<String, String>, _timeout: Duration) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .map(|html| html.as_bytes().to_vec())
            .ok_or_else(|| PagebriefError::FetchFailed(format!("connection refused: {}", url)))
    }
}

/// Replays scripted responses, then answers "fake summary" forever
#[derive(Default)]
pub struct FakeModel {
    script: Mutex<VecDeque<Result<ModelResponse>>>,
    pub requests: Mutex<Vec<ModelRequest>>,
    fail_always: bool,
}

impl FakeModel {
    pub fn scripted(responses: Vec<Result<ModelResponse>>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_always: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> ModelRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

impl Model for FakeModel {
    fn complete(&self, request: &ModelRequest) -> Result<ModelResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_always {
            return Err(PagebriefError::ModelFailed("HTTP 529: overloaded".into()));
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(text_response("fake summary")))
    }
}

pub fn text_response(text: &str) -> ModelResponse {
    ModelResponse {
        content: vec![ContentBlock::text(text)],
        stop_reason: Some("end_turn".into()),
    }
}

pub fn tool_response(calls: &[(&str, &str, Value)]) -> ModelResponse {
    ModelResponse {
        content: calls
            .iter()
            .map(|(id, name, input)| ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input: input.clone(),
            })
            .collect(),
        stop_reason: Some("tool_use".into()),
    }
}

pub struct FakeRenderer {
    payload: Result<Value>,
    pub calls: AtomicUsize,
}

impl FakeRenderer {
    pub fn returning(payload: Value) -> Self {
        Self {
            payload: Ok(payload),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            payload: Err(PagebriefError::RenderFailed("browser crashed".into())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Renderer for FakeRenderer {
    fn render(&self, _url: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.payload {
            Ok(value) => Ok(value.clone()),
            Err(e) => Err(PagebriefError::RenderFailed(e.to_string())),
        }
    }
}

#[derive(Default)]
pub struct FakeMessenger {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl Messenger for FakeMessenger {
    fn notify(&self, _chat_id: &str, _text: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PagebriefError::NotificationError("chat not found".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSearch {
    pub queries: Mutex<Vec<String>>,
}

impl WebSearch for FakeSearch {
    fn search(&self, query: &str) -> Result<String> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(format!("results for {}", query))
    }
}

#[derive(Default)]
pub struct FakeFiles {
    pub calls: AtomicUsize,
}

impl FileAnalyzer for FakeFiles {
    fn analyze(&self, url: &str) -> ToolOutput {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ToolOutput::Text(format!("file at {}", url))
    }
}

/// Handles on every fake wired into a [`Services`]
pub struct Harness {
    pub fetcher: Arc<FakeFetcher>,
    pub model: Arc<FakeModel>,
    pub cache: Arc<MemoryCache>,
    pub renderer: Option<Arc<FakeRenderer>>,
    pub messenger: Arc<FakeMessenger>,
    pub search: Arc<FakeSearch>,
    pub files: Arc<FakeFiles>,
}

impl Harness {
    pub fn new(fetcher: FakeFetcher, model: FakeModel) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            model: Arc::new(model),
            cache: Arc::new(MemoryCache::new()),
            renderer: None,
            messenger: Arc::new(FakeMessenger::default()),
            search: Arc::new(FakeSearch::default()),
            files: Arc::new(FakeFiles::default()),
        }
    }

    pub fn with_renderer(mut self, renderer: FakeRenderer) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn with_messenger(mut self, messenger: FakeMessenger) -> Self {
        self.messenger = Arc::new(messenger);
        self
    }

    pub fn renderer_calls(&self) -> usize {
        self.renderer.as_ref().map_or(0, |r| r.calls())
    }

    pub fn services(&self, config: Config) -> Services {
        Services {
            config,
            fetcher: self.fetcher.clone(),
            model: self.model.clone(),
            cache: self.cache.clone() as Arc<dyn SummaryCache>,
            renderer: self
                .renderer
                .clone()
                .map(|r| r as Arc<dyn Renderer>),
            messenger: Some(self.messenger.clone() as Arc<dyn Messenger>),
            search: self.search.clone(),
            files: self.files.clone(),
        }
    }
}

/// 150-character article body
pub const BODY_150: &str = "The city council approved a new transit plan on Tuesday that adds three bus lines, extends service hours, and funds safer crossings near every school.";

/// Next.js page whose only content is in the hydration payload
pub fn hydration_page() -> String {
    let payload = serde_json::json!({
        "props": {"pageProps": {"story": {"body": BODY_150, "slug": "/news/transit"}}},
        "page": "/news/[slug]"
    });
    format!(
        r#"<html><head><title>Transit plan</title></head><body><div id="__next"></div><script id="__NEXT_DATA__" type="application/json">{}</script></body></html>"#,
        payload
    )
}

/// Plain page with a little unstructured body text (fallback:body, score 15)
pub fn thin_page() -> String {
    r#"<html><head><title>Bakery</title></head><body><div>Our store opens next week with fresh bread, local coffee and more.</div></body></html>"#.to_string()
}

/// Client-rendered shell with no content at all
pub fn empty_shell() -> String {
    r#"<html><head><title>App</title></head><body><div id="root"></div><script src="/app.js"></script></body></html>"#.to_string()
}
