use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::error::{PagebriefError, Result};
use crate::messages::{fill, Locale};

const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com/";
const MAX_RELATED_TOPICS: usize = 5;

/// Web lookup used by the `web_search` tool
pub trait WebSearch: Send + Sync {
    /// Search and return a plain-text digest for the model
    fn search(&self, query: &str) -> Result<String>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default, rename = "Abstract")]
    abstract_text: String,
    #[serde(default)]
    abstract_source: String,
    #[serde(default)]
    related_topics: Vec<serde_json::Value>,
}

/// DuckDuckGo instant-answer API (no key needed)
pub struct DuckDuckGo {
    agent: ureq::Agent,
    locale: Locale,
}

impl DuckDuckGo {
    pub fn new(locale: Locale, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { agent, locale }
    }
}

impl WebSearch for DuckDuckGo {
    fn search(&self, query: &str) -> Result<String> {
        info!("Executing web search: {}", query);

        let answer: InstantAnswer = self
            .agent
            .get(DUCKDUCKGO_URL)
            .query("q", query)
            .query("format", "json")
            .query("no_html", "1")
            .query("skip_disambig", "1")
            .call()
            .map_err(|e| PagebriefError::SearchFailed(e.to_string()))?
            .into_body()
            .read_json()
            .map_err(|e| PagebriefError::SearchFailed(e.to_string()))?;

        Ok(format_answer(&answer, query, self.locale))
    }
}

fn format_answer(answer: &InstantAnswer, query: &str, locale: Locale) -> String {
    let m = locale.messages();
    let mut lines = Vec::new();

    if !answer.abstract_text.is_empty() {
        lines.push(format!("{}: {}", m.search_abstract, answer.abstract_text));
        if !answer.abstract_source.is_empty() {
            lines.push(format!("{}: {}", m.search_source, answer.abstract_source));
        }
    }

    let related: Vec<&str> = answer
        .related_topics
        .iter()
        .take(MAX_RELATED_TOPICS)
        .filter_map(|topic| topic.get("Text").and_then(|t| t.as_str()))
        .collect();
    if !related.is_empty() {
        lines.push(format!("\n{}:", m.search_related));
        lines.extend(related.iter().map(|text| format!("- {}", text)));
    }

    if lines.is_empty() {
        return fill(m.search_no_results, &[("query", query)]);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answer(value: serde_json::Value) -> InstantAnswer {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_format_abstract_and_topics() {
        let a = answer(json!({
            "Abstract": "Rust is a language.",
            "AbstractSource": "Wikipedia",
            "RelatedTopics": [
                {"Text": "Cargo"}, {"Name": "group", "Topics": []}, {"Text": "Crates"},
                {"Text": "3"}, {"Text": "4"}, {"Text": "5"}, {"Text": "6"}
            ]
        }));
        let text = format_answer(&a, "rust", Locale::En);
        assert!(text.starts_with("Abstract: Rust is a language.\nSource: Wikipedia"));
        assert!(text.contains("- Cargo\n- Crates"));
        assert!(!text.contains("- 5"));
    }

    #[test]
    fn test_format_empty_answer() {
        let text = format_answer(&InstantAnswer::default(), "zzz", Locale::ZhTw);
        assert!(text.contains("「zzz」"));
    }
}
