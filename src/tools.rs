//! The closed set of tools offered to the model.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::model::ContentBlock;

pub const WEB_SEARCH: &str = "web_search";
pub const SUMMARIZE_URL: &str = "summarize_url";
pub const ANALYZE_FILE_URL: &str = "analyze_file_url";

/// A parsed tool request. Anything not matching a manifest entry exactly,
/// name and required string parameter, is `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    WebSearch { query: String },
    SummarizeUrl { url: String },
    AnalyzeFileUrl { url: String },
    Unknown { name: String },
}

impl ToolCall {
    pub fn parse(name: &str, input: &Value) -> Self {
        let arg = |key: &str| input.get(key).and_then(Value::as_str).map(String::from);
        let parsed = match name {
            WEB_SEARCH => arg("query").map(|query| ToolCall::WebSearch { query }),
            SUMMARIZE_URL => arg("url").map(|url| ToolCall::SummarizeUrl { url }),
            ANALYZE_FILE_URL => arg("url").map(|url| ToolCall::AnalyzeFileUrl { url }),
            _ => None,
        };
        parsed.unwrap_or_else(|| ToolCall::Unknown {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            ToolCall::WebSearch { .. } => WEB_SEARCH,
            ToolCall::SummarizeUrl { .. } => SUMMARIZE_URL,
            ToolCall::AnalyzeFileUrl { .. } => ANALYZE_FILE_URL,
            ToolCall::Unknown { name } => name,
        }
    }
}

/// One tool request from a model turn, with its correlation id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub id: String,
    pub call: ToolCall,
}

impl ToolInvocation {
    pub fn new(id: &str, name: &str, input: &Value) -> Self {
        Self {
            id: id.to_string(),
            call: ToolCall::parse(name, input),
        }
    }
}

/// Result of running one tool: plain text, or content blocks such as an
/// inline image with an instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl ToolOutput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolOutput::Text(text) => Some(text),
            ToolOutput::Blocks(_) => None,
        }
    }
}

/// Tool definitions sent with every agent round
pub fn manifest() -> Vec<Value> {
    vec![
        json!({
            "name": WEB_SEARCH,
            "description": "Search the web for current information. Use when the user asks about recent events or facts you are unsure of.",
            "input_schema": {
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search query"}
                },
                "required": ["query"]
            }
        }),
        json!({
            "name": SUMMARIZE_URL,
            "description": "Fetch a web page and summarize it. Use for regular web pages, not file links.",
            "input_schema": {
                "type": "object",
                "properties": {
                    "url": {"type": "string", "description": "URL of the page to summarize"}
                },
                "required": ["url"]
            }
        }),
        json!({
            "name": ANALYZE_FILE_URL,
            "description": "Download and analyze a file by URL. Supports images (.jpg .jpeg .png .gif .webp), PDF (.pdf) and Office documents (.docx .pptx).",
            "input_schema": {
                "type": "object",
                "properties": {
                    "url": {"type": "string", "description": "URL of the file"}
                },
                "required": ["url"]
            }
        }),
    ]
}
