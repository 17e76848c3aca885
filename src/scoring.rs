//! Deterministic 0-100 quality score for recovered text.
//!
//! The score is the clamped sum of five independent rule groups. Each group
//! is a named table so it can be checked in isolation, and every
//! contribution is recorded in the rationale string.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::metadata::PageMetadata;
use crate::source::{best_confidence, Confidence, SourceTag};

/// Scores at or above this are summarized directly
pub const SUFFICIENT_THRESHOLD: i32 = 40;

/// Scores below this are unprocessable
pub const INSUFFICIENT_THRESHOLD: i32 = 15;

/// Word-count tiers: (minimum words, points)
pub const WORD_TIERS: &[(usize, i32)] = &[(500, 40), (200, 30), (100, 20), (50, 10)];

/// Paragraph tiers: (minimum qualifying lines, points)
pub const PARAGRAPH_TIERS: &[(usize, i32)] = &[(5, 20), (3, 15), (1, 5)];

/// Shortest line counted as a paragraph
pub const PARAGRAPH_MIN_CHARS: usize = 30;

/// Points per source-confidence tier
pub const SOURCE_POINTS: &[(Confidence, i32, &str)] = &[
    (Confidence::High, 25, "high_confidence_source"),
    (Confidence::Medium, 15, "medium_confidence_source"),
    (Confidence::Fallback, 5, "fallback_source"),
    (Confidence::Unknown, 0, "no_source"),
];

/// Points per metadata signal
pub const METADATA_POINTS: i32 = 5;

/// Only this prefix of the text is scanned for negative signals
pub const NEGATIVE_SCAN_CHARS: usize = 3000;
pub const NEGATIVE_PENALTY: i32 = 10;
pub const NEGATIVE_CAP: i32 = 30;

/// Loading shells, JS walls and unrendered templates
pub const NEGATIVE_SIGNALS: &[(&str, &str)] = &[
    ("loading_ellipsis", r"(?i)loading\.{2,}"),
    ("please_wait", r"(?i)please wait"),
    ("javascript_required", r"(?i)javascript (is )?required"),
    ("enable_javascript", r"(?i)enable javascript"),
    ("mustache_placeholder", r"\{\{[\w.]+\}\}"),
    ("erb_placeholder", r"<%[^%]+%>"),
    ("jinja_placeholder", r"\{%[^%]+%\}"),
    ("object_object", r"(?i)\[object object\]"),
];

/// All negative signals as one alternation, so overlapping spans count once
static NEGATIVE_SIGNAL_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = NEGATIVE_SIGNALS
        .iter()
        .map(|(_, pattern)| format!("(?:{})", pattern))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&alternation).expect("Invalid negative signal regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Sufficient,
    Insufficient,
    Unprocessable,
}

impl Decision {
    pub fn from_score(score: u8) -> Self {
        let score = i32::from(score);
        if score >= SUFFICIENT_THRESHOLD {
            Decision::Sufficient
        } else if score >= INSUFFICIENT_THRESHOLD {
            Decision::Insufficient
        } else {
            Decision::Unprocessable
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Decision::Sufficient => "sufficient",
            Decision::Insufficient => "insufficient",
            Decision::Unprocessable => "unprocessable",
        })
    }
}

/// Outcome of scoring one extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: u8,
    pub decision: Decision,
    pub rationale: String,
}

/// Score `text` given where it came from and what the head tags say
pub fn assess_quality(text: &str, sources: &[SourceTag], metadata: &PageMetadata) -> ScoreReport {
    let mut score: i32 = 0;
    let mut reasons: Vec<String> = Vec::new();

    let words = word_count(text);
    let points = tier_points(WORD_TIERS, words);
    score += points;
    reasons.push(format!("word_count={} (+{})", words, points));

    let paragraphs = paragraph_count(text);
    let points = tier_points(PARAGRAPH_TIERS, paragraphs);
    score += points;
    reasons.push(format!("paragraphs={} (+{})", paragraphs, points));

    let (points, label) = source_points(sources);
    score += points;
    reasons.push(format!("{} (+{})", label, points));

    let points = metadata_points(metadata);
    score += points;
    reasons.push(format!("metadata (+{})", points));

    let hits = negative_signal_count(text);
    if hits > 0 {
        let penalty = negative_penalty(hits);
        score -= penalty;
        reasons.push(format!("negative_signals={} (-{})", hits, penalty));
    }

    let score = score.clamp(0, 100) as u8;
    ScoreReport {
        score,
        decision: Decision::from_score(score),
        rationale: reasons.join("; "),
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lines of at least [`PARAGRAPH_MIN_CHARS`] after trimming
pub fn paragraph_count(text: &str) -> usize {
    text.split('\n')
        .filter(|line| line.trim().chars().count() >= PARAGRAPH_MIN_CHARS)
        .count()
}

fn tier_points(tiers: &[(usize, i32)], value: usize) -> i32 {
    tiers
        .iter()
        .find(|(min, _)| value >= *min)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

fn source_points(sources: &[SourceTag]) -> (i32, &'static str) {
    let best = best_confidence(sources);
    SOURCE_POINTS
        .iter()
        .find(|(tier, _, _)| *tier == best)
        .map(|(_, points, label)| (*points, *label))
        .unwrap_or((0, "no_source"))
}

pub fn metadata_points(metadata: &PageMetadata) -> i32 {
    [
        metadata.has_title(),
        metadata.has_description(),
        metadata.has_attribution(),
    ]
    .iter()
    .filter(|present| **present)
    .count() as i32
        * METADATA_POINTS
}

/// Non-overlapping negative signal matches within the scanned prefix
pub fn negative_signal_count(text: &str) -> usize {
    let prefix: String = text.chars().take(NEGATIVE_SCAN_CHARS).collect();
    NEGATIVE_SIGNAL_RE.find_iter(&prefix).count()
}

fn negative_penalty(hits: usize) -> i32 {
    (hits as i32).saturating_mul(NEGATIVE_PENALTY).min(NEGATIVE_CAP)
}
