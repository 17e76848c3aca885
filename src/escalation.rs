//! Browser-render escalation.
//!
//! When static HTML is not enough, the URL is handed to a renderer that
//! loads the page in a real browser and returns a finished summary as JSON.
//! The renderer is an external process or service; this module only speaks
//! its payload contract and decides what to do when it fails.

use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{info, warn};

use crate::cache::CachedSummary;
use crate::config::RenderTarget;
use crate::error::{PagebriefError, Result};
use crate::notify::notify_in_background;
use crate::pipeline::{RequestContext, Services};
use crate::router::Notice;
use crate::summarize::summarize_content;

/// Heavy browser renderer
pub trait Renderer: Send + Sync {
    /// Render `url` and return the raw JSON payload
    fn render(&self, url: &str) -> Result<Value>;
}

/// Validated renderer success payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub title: Option<String>,
    pub summary: String,
    pub content_hash: Option<String>,
    pub raw_content: Option<String>,
}

impl RenderOutcome {
    /// `summary` (or the older `summary_zh_tw`) must be a string. Any
    /// `errorMessage` makes the payload a failure.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        if let Some(error) = payload.get("errorMessage") {
            let message = error.as_str().map(String::from).unwrap_or_else(|| error.to_string());
            return Err(PagebriefError::RenderFailed(message));
        }

        let summary = payload
            .get("summary")
            .or_else(|| payload.get("summary_zh_tw"))
            .and_then(Value::as_str)
            .ok_or_else(|| PagebriefError::RenderFailed("payload has no summary".into()))?;

        let optional = |key: &str| payload.get(key).and_then(Value::as_str).map(String::from);

        Ok(Self {
            title: optional("title"),
            summary: summary.to_string(),
            content_hash: optional("content_hash"),
            raw_content: optional("raw_content"),
        })
    }
}

/// POSTs `{"url": ...}` to a render endpoint
pub struct HttpRenderer {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpRenderer {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { agent, endpoint }
    }
}

impl Renderer for HttpRenderer {
    fn render(&self, url: &str) -> Result<Value> {
        info!("Invoking browser renderer for: {}", url);
        let payload = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .send_json(serde_json::json!({ "url": url }))
            .map_err(|e| PagebriefError::RenderFailed(e.to_string()))?
            .into_body()
            .read_json()
            .map_err(|e| PagebriefError::RenderFailed(e.to_string()))?;
        Ok(payload)
    }
}

/// Runs a local command with the URL as its last argument and reads JSON
/// from stdout
pub struct CommandRenderer {
    command: String,
    timeout: Duration,
}

impl CommandRenderer {
    pub fn new(command: String, timeout: Duration) -> Self {
        Self { command, timeout }
    }
}

fn read_pipe<R: Read + Send + 'static>(pipe: Option<R>) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

impl Renderer for CommandRenderer {
    fn render(&self, url: &str) -> Result<Value> {
        info!("Running render command for: {}", url);

        // URL goes in as $1 so the shell never interprets it
        let mut child = Command::new("sh")
            .args(["-c", &format!("{} \"$1\"", self.command), "pagebrief-render", url])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = read_pipe(child.stdout.take());
        let stderr = read_pipe(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(PagebriefError::RenderFailed(format!(
                    "render command timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
            std::thread::sleep(Duration::from_millis(50));
        };

        let stdout = stdout
            .join()
            .map_err(|_| PagebriefError::RenderFailed("stdout reader panicked".into()))?;
        let stderr = stderr.join().unwrap_or_default();

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(PagebriefError::RenderFailed(format!(
                "render command failed: {}",
                stderr.trim()
            )));
        }

        Ok(serde_json::from_slice(&stdout)?)
    }
}

/// Build the renderer for a configured target
pub fn renderer_for(target: &RenderTarget, timeout: Duration) -> Arc<dyn Renderer> {
    match target {
        RenderTarget::Http { url } => Arc::new(HttpRenderer::new(url.clone(), timeout)),
        RenderTarget::Command { command } => Arc::new(CommandRenderer::new(command.clone(), timeout)),
    }
}

/// Static content to fall back on if rendering fails
#[derive(Debug, Clone, Copy)]
pub struct StaticFallback<'a> {
    pub title: &'a str,
    pub text: &'a str,
}

/// Escalate `url` to the browser renderer.
///
/// Sends the progress notice (best effort), renders, caches and returns the
/// summary. On render failure the static text is summarized instead when
/// there is any; otherwise the render-failure refusal is returned.
pub fn escalate(
    services: &Services,
    ctx: &RequestContext,
    url: &str,
    notice: Notice,
    fallback: Option<StaticFallback<'_>>,
) -> String {
    let m = services.config.locale.messages();

    if let (Some(messenger), Some(chat_id)) = (&services.messenger, &ctx.chat_id) {
        notify_in_background(
            messenger.clone(),
            chat_id.clone(),
            notice.text(services.config.locale).to_string(),
        );
    }

    let rendered = match &services.renderer {
        Some(renderer) => renderer
            .render(url)
            .and_then(|payload| RenderOutcome::from_payload(&payload)),
        None => Err(PagebriefError::RenderFailed("no renderer configured".into())),
    };

    match rendered {
        Ok(outcome) => {
            info!("Browser render succeeded for {}", url);
            let entry = CachedSummary {
                title: outcome.title,
                summary: outcome.summary.clone(),
                content_hash: outcome.content_hash,
                raw_content: outcome.raw_content,
            };
            if let Err(e) = services.cache.put(&ctx.conversation_id, url, &entry) {
                warn!("Failed to cache rendered summary for {}: {}", url, e);
            }
            outcome.summary
        }
        Err(e) => {
            warn!("Browser render failed for {}: {}", url, e);
            match fallback.filter(|f| !f.text.is_empty()) {
                Some(fallback) => {
                    info!("Falling back to static text for {}", url);
                    summarize_content(services, ctx, url, fallback.title, fallback.text).unwrap_or_else(|e| {
                        warn!("Fallback summary failed for {}: {}", url, e);
                        m.refuse_summary_failed.to_string()
                    })
                }
                None => m.refuse_render_failed.to_string(),
            }
        }
    }
}
