use std::fmt;

use serde::{Deserialize, Serialize};

/// Which extractor or strategy produced a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    #[serde(rename = "next_data")]
    NextData,
    #[serde(rename = "nuxt_data")]
    NuxtData,
    #[serde(rename = "json_ld")]
    JsonLd,
    #[serde(rename = "semantic:article")]
    SemanticArticle,
    #[serde(rename = "semantic:main")]
    SemanticMain,
    #[serde(rename = "semantic:role-main")]
    SemanticRoleMain,
    #[serde(rename = "semantic:id-match")]
    SemanticIdMatch,
    #[serde(rename = "semantic:class-match")]
    SemanticClassMatch,
    #[serde(rename = "fallback:body")]
    FallbackBody,
    #[serde(rename = "none")]
    None,
}

/// How much a source tag is trusted to carry real article content
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    Unknown,
    Fallback,
    Medium,
    High,
}

/// Source-confidence tiers
pub const CONFIDENCE_TIERS: &[(SourceTag, Confidence)] = &[
    (SourceTag::NextData, Confidence::High),
    (SourceTag::NuxtData, Confidence::High),
    (SourceTag::JsonLd, Confidence::High),
    (SourceTag::SemanticArticle, Confidence::High),
    (SourceTag::SemanticMain, Confidence::Medium),
    (SourceTag::SemanticRoleMain, Confidence::Medium),
    (SourceTag::SemanticIdMatch, Confidence::Medium),
    (SourceTag::SemanticClassMatch, Confidence::Medium),
    (SourceTag::FallbackBody, Confidence::Fallback),
    (SourceTag::None, Confidence::Unknown),
];

impl SourceTag {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceTag::NextData => "next_data",
            SourceTag::NuxtData => "nuxt_data",
            SourceTag::JsonLd => "json_ld",
            SourceTag::SemanticArticle => "semantic:article",
            SourceTag::SemanticMain => "semantic:main",
            SourceTag::SemanticRoleMain => "semantic:role-main",
            SourceTag::SemanticIdMatch => "semantic:id-match",
            SourceTag::SemanticClassMatch => "semantic:class-match",
            SourceTag::FallbackBody => "fallback:body",
            SourceTag::None => "none",
        }
    }

    pub fn confidence(self) -> Confidence {
        CONFIDENCE_TIERS
            .iter()
            .find(|(tag, _)| *tag == self)
            .map(|(_, c)| *c)
            .unwrap_or(Confidence::Unknown)
    }

    /// Content from a recognized container, i.e. anything but the bare body fallback
    pub fn is_reliable(self) -> bool {
        self.confidence() >= Confidence::Medium
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Highest confidence tier among `sources`
pub fn best_confidence(sources: &[SourceTag]) -> Confidence {
    sources
        .iter()
        .map(|s| s.confidence())
        .max()
        .unwrap_or(Confidence::Unknown)
}
