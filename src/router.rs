use tracing::info;

use crate::extract::ExtractionResult;
use crate::messages::{fill, Locale};
use crate::scoring::Decision;

/// Which progress notice accompanies an escalation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Static content was found but looks like an app shell
    Incomplete,
    /// Nothing usable came back from the static path
    Special,
}

impl Notice {
    pub fn text(self, locale: Locale) -> &'static str {
        let m = locale.messages();
        match self {
            Notice::Incomplete => m.notice_incomplete,
            Notice::Special => m.notice_special,
        }
    }
}

/// What to do with one extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Summarize the extracted text as is
    Summarize,
    /// Hand the URL to the browser renderer
    Escalate(Notice),
    /// Give up with a localized message
    Refuse(String),
}

/// Map an extraction to an action. `escalation_available` is whether a
/// renderer is configured.
pub fn route(result: &ExtractionResult, escalation_available: bool, locale: Locale) -> Route {
    let m = locale.messages();
    let has_text = !result.text.is_empty();

    let chosen = match result.decision {
        Decision::Sufficient => Route::Summarize,
        Decision::Insufficient => {
            if has_text && result.has_reliable_source() {
                Route::Summarize
            } else if escalation_available {
                Route::Escalate(Notice::Incomplete)
            } else if has_text {
                Route::Summarize
            } else {
                Route::Refuse(m.refuse_not_enough.to_string())
            }
        }
        Decision::Unprocessable => {
            if escalation_available {
                Route::Escalate(Notice::Special)
            } else {
                Route::Refuse(fill(m.refuse_with_reason, &[("reason", &result.rationale)]))
            }
        }
    };

    info!("Routed {} extraction to {:?}", result.decision, chosen);
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PageMetadata;
    use crate::source::SourceTag;

    fn result(text: &str, sources: Vec<SourceTag>, decision: Decision) -> ExtractionResult {
        ExtractionResult {
            text: text.into(),
            sources,
            metadata: PageMetadata::default(),
            title: None,
            quality_score: 0,
            decision,
            rationale: "word_count=0 (+0)".into(),
        }
    }

    #[test]
    fn test_sufficient_always_summarizes() {
        let r = result("text", vec![SourceTag::FallbackBody], Decision::Sufficient);
        assert_eq!(route(&r, true, Locale::En), Route::Summarize);
    }

    #[test]
    fn test_insufficient_reliable_source_summarizes() {
        let r = result("short", vec![SourceTag::SemanticClassMatch], Decision::Insufficient);
        assert_eq!(route(&r, true, Locale::En), Route::Summarize);
    }

    #[test]
    fn test_insufficient_fallback_body_escalates() {
        let r = result("shell", vec![SourceTag::FallbackBody], Decision::Insufficient);
        assert_eq!(route(&r, true, Locale::En), Route::Escalate(Notice::Incomplete));
        assert_eq!(route(&r, false, Locale::En), Route::Summarize);
    }

    #[test]
    fn test_insufficient_empty_refuses() {
        let r = result("", vec![], Decision::Insufficient);
        assert_eq!(
            route(&r, false, Locale::En),
            Route::Refuse(Locale::En.messages().refuse_not_enough.to_string())
        );
    }

    #[test]
    fn test_unprocessable() {
        let r = result("", vec![], Decision::Unprocessable);
        assert_eq!(route(&r, true, Locale::En), Route::Escalate(Notice::Special));
        match route(&r, false, Locale::En) {
            Route::Refuse(message) => assert!(message.contains("word_count=0 (+0)")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
