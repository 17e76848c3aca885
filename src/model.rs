//! Messages-API types and the model client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::{AuthScheme, ModelConfig};
use crate::error::{PagebriefError, Result};
use crate::tools::ToolOutput;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Inline file payload for image and document blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub media_type: String,
    pub data: String,
}

impl MediaSource {
    pub fn base64(media_type: &str, data: String) -> Self {
        Self {
            kind: "base64".to_string(),
            media_type: media_type.to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        source: MediaSource,
    },
    Document {
        source: MediaSource,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: ToolOutput,
    },
    /// Block kinds this client does not use; dropped when echoed back
    #[serde(other)]
    Unsupported,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self { role: Role::User, content }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// Concatenated text blocks
    pub fn text(&self) -> String {
        join_text(&self.content)
    }
}

/// One model call. The model id is supplied by the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRequest {
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl ModelResponse {
    pub fn text(&self) -> String {
        join_text(&self.content)
    }

    /// `(id, name, input)` of every tool call, in request order
    pub fn tool_uses(&self) -> Vec<(&str, &str, &Value)> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => {
                    Some((id.as_str(), name.as_str(), input))
                }
                _ => None,
            })
            .collect()
    }
}

fn join_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

/// A chat-completion backend
pub trait Model: Send + Sync {
    fn complete(&self, request: &ModelRequest) -> Result<ModelResponse>;
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    #[serde(flatten)]
    request: &'a ModelRequest,
}

/// Anthropic Messages API client
pub struct AnthropicModel {
    agent: ureq::Agent,
    config: ModelConfig,
}

impl AnthropicModel {
    pub fn new(config: ModelConfig, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent, config }
    }

    fn endpoint(&self) -> String {
        let base = self.config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        format!("{}/v1/messages", base.trim_end_matches('/'))
    }
}

impl Model for AnthropicModel {
    fn complete(&self, request: &ModelRequest) -> Result<ModelResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| PagebriefError::ModelFailed("ANTHROPIC_API_KEY is not set".into()))?;

        let body = ApiRequest {
            model: &self.config.model,
            request,
        };

        let call = self
            .agent
            .post(&self.endpoint())
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json");
        let call = match self.config.auth {
            AuthScheme::ApiKey => call.header("x-api-key", api_key),
            AuthScheme::Bearer => call.header("Authorization", &format!("Bearer {}", api_key)),
        };

        let mut response = call
            .send_json(&body)
            .map_err(|e| PagebriefError::ModelFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.body_mut().read_to_string().unwrap_or_default();
            return Err(PagebriefError::ModelFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                detail.chars().take(500).collect::<String>()
            )));
        }

        let parsed: ModelResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| PagebriefError::ModelFailed(e.to_string()))?;
        debug!(
            "Model replied: {} blocks, stop_reason={:?}",
            parsed.content.len(),
            parsed.stop_reason
        );
        Ok(parsed)
    }
}
