//! Tool-use conversation loop.
//!
//! The agent alternates between asking the model for a reply and running the
//! tools it requested. Each tool turn appends two messages to the history:
//! the assistant content as the model sent it, and one user message holding
//! every tool result in request order. The loop ends when a reply carries no
//! tool calls, the round cap is hit, or the model cannot be reached.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::messages::{fill, Locale};
use crate::model::{ContentBlock, Message, ModelRequest, Role};
use crate::pipeline::{summarize_url, RequestContext, Services};
use crate::tools::{manifest, ToolCall, ToolInvocation, ToolOutput};

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:[-\w.]|%[0-9a-fA-F]{2})+\S*").expect("Invalid URL regex")
});

/// Messages at or above this length are treated as questions, not link shares
const AUTO_INSTRUCTION_MAX_CHARS: usize = 100;

/// URLs in order of appearance
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_RE.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// System prompt with the current time at `utc_offset_hours`
pub fn system_prompt(locale: Locale, utc_offset_hours: i32, now: DateTime<Utc>) -> String {
    let offset = utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());
    let local = now.with_timezone(&offset);
    let stamp = local.format("%Y-%m-%d %H:%M (%A) UTC%:z").to_string();
    fill(locale.messages().system_prompt, &[("now", &stamp)])
}

/// Rewrite a lone link share into an explicit `summarize_url` request
pub fn apply_auto_instruction(history: &mut [Message], locale: Locale) {
    let [only] = history else {
        return;
    };
    if only.role != Role::User {
        return;
    }

    let text = only.text();
    let text = text.trim();
    let Some(url) = extract_urls(text).into_iter().next() else {
        return;
    };

    if text.starts_with("http") || text.chars().count() < AUTO_INSTRUCTION_MAX_CHARS {
        info!("Rewriting link share into summarize instruction for {}", url);
        *only = Message::user_text(fill(
            locale.messages().summarize_instruction,
            &[("url", &url)],
        ));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentState {
    AwaitingModel,
    ExecutingTools(Vec<ToolInvocation>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model answered without requesting tools
    Answered,
    /// The round cap was reached
    RoundLimit,
    /// The model could not be reached
    ModelFailed,
}

#[derive(Debug, Clone)]
pub struct AgentReply {
    pub text: String,
    pub stop: StopReason,
    /// Model calls made
    pub rounds: usize,
    /// Full history including tool turns
    pub history: Vec<Message>,
}

pub struct Agent<'a> {
    services: &'a Services,
    ctx: RequestContext,
}

impl<'a> Agent<'a> {
    pub fn new(services: &'a Services, ctx: RequestContext) -> Self {
        Self { services, ctx }
    }

    /// Run the conversation to completion
    pub fn run(&self, history: Vec<Message>) -> AgentReply {
        let config = &self.services.config;
        let m = config.locale.messages();

        let mut history = history;
        apply_auto_instruction(&mut history, config.locale);
        info!("Processing conversation with {} messages", history.len());

        let system = system_prompt(config.locale, config.utc_offset_hours, Utc::now());
        let tools = manifest();
        let mut rounds = 0;
        let mut state = AgentState::AwaitingModel;

        loop {
            state = match state {
                AgentState::AwaitingModel => {
                    if rounds >= config.max_agent_rounds {
                        warn!("Agent stopped after {} rounds", rounds);
                        return AgentReply {
                            text: m.agent_round_limit.to_string(),
                            stop: StopReason::RoundLimit,
                            rounds,
                            history,
                        };
                    }
                    rounds += 1;

                    let request = ModelRequest {
                        max_tokens: config.model.max_tokens,
                        system: Some(system.clone()),
                        messages: history.clone(),
                        tools: tools.clone(),
                    };
                    let response = match self.services.model.complete(&request) {
                        Ok(response) => response,
                        Err(e) => {
                            warn!("Model call failed in round {}: {}", rounds, e);
                            return AgentReply {
                                text: m.agent_model_failed.to_string(),
                                stop: StopReason::ModelFailed,
                                rounds,
                                history,
                            };
                        }
                    };

                    let turn: Vec<ToolInvocation> = response
                        .tool_uses()
                        .into_iter()
                        .map(|(id, name, input)| ToolInvocation::new(id, name, input))
                        .collect();

                    if turn.is_empty() {
                        let text = response.text();
                        let text = if text.trim().is_empty() {
                            m.agent_no_reply.to_string()
                        } else {
                            text
                        };
                        history.push(Message::assistant(vec![ContentBlock::text(text.clone())]));
                        return AgentReply {
                            text,
                            stop: StopReason::Answered,
                            rounds,
                            history,
                        };
                    }

                    let echoed = response
                        .content
                        .into_iter()
                        .filter(|block| !matches!(block, ContentBlock::Unsupported))
                        .collect();
                    history.push(Message::assistant(echoed));
                    AgentState::ExecutingTools(turn)
                }
                AgentState::ExecutingTools(turn) => {
                    let results = turn
                        .iter()
                        .map(|invocation| ContentBlock::ToolResult {
                            tool_use_id: invocation.id.clone(),
                            content: self.dispatch(&invocation.call),
                        })
                        .collect();
                    history.push(Message::user(results));
                    AgentState::AwaitingModel
                }
            };
        }
    }

    /// Run one tool. Failures become text for the model.
    pub fn dispatch(&self, call: &ToolCall) -> ToolOutput {
        info!("Tool use: {}", call.name());
        let m = self.services.config.locale.messages();
        match call {
            ToolCall::WebSearch { query } => match self.services.search.search(query) {
                Ok(text) => ToolOutput::Text(text),
                Err(e) => {
                    warn!("Web search failed: {}", e);
                    ToolOutput::Text(m.search_failed.to_string())
                }
            },
            ToolCall::SummarizeUrl { url } => {
                ToolOutput::Text(summarize_url(self.services, &self.ctx, url))
            }
            ToolCall::AnalyzeFileUrl { url } => self.services.files.analyze(url),
            ToolCall::Unknown { name } => ToolOutput::Text(fill(m.unknown_tool, &[("name", name)])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_extract_urls() {
        let urls = extract_urls("see https://example.com/a?b=1 and http://x.org/%E4%B8%AD end");
        assert_eq!(urls, vec!["https://example.com/a?b=1", "http://x.org/%E4%B8%AD"]);
        assert!(extract_urls("no links here").is_empty());
    }

    #[test]
    fn test_auto_instruction_for_bare_link() {
        let mut history = vec![Message::user_text("https://example.com/post")];
        apply_auto_instruction(&mut history, Locale::En);
        assert_eq!(
            history[0].text(),
            "Please use the summarize_url tool to summarize this web page: https://example.com/post"
        );
    }

    #[test]
    fn test_auto_instruction_for_short_message() {
        let mut history = vec![Message::user_text("what is this? https://example.com")];
        apply_auto_instruction(&mut history, Locale::ZhTw);
        assert!(history[0].text().contains("summarize_url"));
    }

    #[test]
    fn test_no_auto_instruction_for_long_question() {
        let question = format!("{} https://example.com", "why ".repeat(30));
        let mut history = vec![Message::user_text(question.clone())];
        apply_auto_instruction(&mut history, Locale::En);
        assert_eq!(history[0].text(), question);
    }

    #[test]
    fn test_no_auto_instruction_mid_conversation() {
        let mut history = vec![
            Message::user_text("hi"),
            Message::assistant(vec![ContentBlock::text("hello")]),
            Message::user_text("https://example.com"),
        ];
        apply_auto_instruction(&mut history, Locale::En);
        assert_eq!(history[2].text(), "https://example.com");
    }

    #[test]
    fn test_system_prompt_uses_offset() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 20, 30, 0).unwrap();
        let prompt = system_prompt(Locale::En, 8, now);
        assert!(prompt.contains("2024-01-02 04:30 (Tuesday) UTC+08:00"));
    }

    #[test]
    fn test_system_prompt_out_of_range_offset_uses_utc() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 20, 30, 0).unwrap();
        for hours in [i32::MAX, 48, -30] {
            let prompt = system_prompt(Locale::En, hours, now);
            assert!(prompt.contains("2024-01-01 20:30 (Monday) UTC+00:00"), "{}", hours);
        }
    }
}
