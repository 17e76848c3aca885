use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::embedded::extract_embedded;
use crate::metadata::{extract_metadata, PageMetadata};
use crate::scoring::{assess_quality, Decision};
use crate::semantic::extract_semantic;
use crate::source::SourceTag;

/// Everything learned from one static-HTML extraction attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Recovered text (possibly empty)
    pub text: String,
    /// Contributing sources, primary first
    pub sources: Vec<SourceTag>,
    pub metadata: PageMetadata,
    /// OG title, then `<title>`
    pub title: Option<String>,
    pub quality_score: u8,
    pub decision: Decision,
    /// Trace of score contributions
    pub rationale: String,
}

impl ExtractionResult {
    pub fn has_reliable_source(&self) -> bool {
        self.sources.iter().any(|s| s.is_reliable())
    }

    pub fn source_labels(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.as_str()).collect()
    }
}

/// Run metadata, embedded-data and semantic extraction over raw HTML, fuse
/// the candidates and score the winner
pub fn extract_page(html: &str) -> ExtractionResult {
    let document = Html::parse_document(html);
    let metadata = extract_metadata(&document);

    let embedded = extract_embedded(&document);
    if let Some((text, tag)) = &embedded {
        info!("Content extracted from embedded data: {} ({} chars)", tag, text.chars().count());
    }

    let (semantic_text, semantic_tag) = extract_semantic(&document);
    let semantic = (!semantic_text.is_empty()).then_some((semantic_text, semantic_tag));

    let (text, sources) = fuse(embedded, semantic);
    let report = assess_quality(&text, &sources, &metadata);

    info!(
        "Content extraction complete: score={}, decision={}, sources={:?}, reason={}",
        report.score,
        report.decision,
        sources.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        report.rationale
    );

    ExtractionResult {
        text,
        sources,
        title: metadata.display_title().map(String::from),
        metadata,
        quality_score: report.score,
        decision: report.decision,
        rationale: report.rationale,
    }
}

/// Keep the longer text; remember the other contributor's tag too.
/// Embedded data wins ties.
pub fn fuse(
    embedded: Option<(String, SourceTag)>,
    semantic: Option<(String, SourceTag)>,
) -> (String, Vec<SourceTag>) {
    let (winner, runner_up) = match (embedded, semantic) {
        (Some(e), Some(s)) => {
            if s.0.chars().count() > e.0.chars().count() {
                (s, Some(e.1))
            } else {
                (e, Some(s.1))
            }
        }
        (Some(e), None) => (e, None),
        (None, Some(s)) => (s, None),
        (None, None) => return (String::new(), Vec::new()),
    };

    let (text, primary) = winner;
    let mut sources = vec![primary];
    if let Some(tag) = runner_up {
        if tag != SourceTag::None && !sources.contains(&tag) {
            sources.push(tag);
        }
    }
    (text, sources)
}
