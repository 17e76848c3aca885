//! Structural HTML extraction.
//!
//! Probes content containers in priority order and measures each one's text
//! with navigation, ads and other chrome skipped.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::source::SourceTag;

/// Minimum characters for a container to be accepted
pub const CONTAINER_MIN_CHARS: usize = 100;

/// Minimum characters for the whole-body fallback
pub const BODY_MIN_CHARS: usize = 50;

/// Elements never holding article text
pub const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "footer", "header", "aside", "iframe",
];

/// ARIA landmark roles for page chrome
pub const NOISE_ROLES: &[&str] = &["navigation", "banner", "contentinfo", "complementary"];

/// Class-name fragments marking chrome; matched as case-insensitive substrings
pub const NOISE_CLASSES: &[&str] = &[
    "sidebar", "menu", "nav", "footer", "header", "ad", "banner", "cookie", "popup", "modal",
    "comment", "share", "social", "related", "recommend",
];

static ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(content|article|post|entry|story)").expect("Invalid id pattern")
});

static CLASS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(article|post|entry|story|content)").expect("Invalid class pattern")
});

static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").expect("selector"));
static MAIN: Lazy<Selector> = Lazy::new(|| Selector::parse("main").expect("selector"));
static ROLE_MAIN: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[role="main"]"#).expect("selector"));
static WITH_ID: Lazy<Selector> = Lazy::new(|| Selector::parse("[id]").expect("selector"));
static WITH_CLASS: Lazy<Selector> = Lazy::new(|| Selector::parse("[class]").expect("selector"));
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("selector"));

/// Extract the main human-authored text. Returns empty text with
/// [`SourceTag::None`] when nothing qualifies.
pub fn extract_semantic(document: &Html) -> (String, SourceTag) {
    let candidates: [(Option<ElementRef>, SourceTag); 5] = [
        (document.select(&ARTICLE).next(), SourceTag::SemanticArticle),
        (document.select(&MAIN).next(), SourceTag::SemanticMain),
        (document.select(&ROLE_MAIN).next(), SourceTag::SemanticRoleMain),
        (
            document
                .select(&WITH_ID)
                .find(|el| el.value().attr("id").is_some_and(|id| ID_PATTERN.is_match(id))),
            SourceTag::SemanticIdMatch,
        ),
        (
            document.select(&WITH_CLASS).find(|el| {
                el.value()
                    .attr("class")
                    .is_some_and(|class| CLASS_PATTERN.is_match(class))
            }),
            SourceTag::SemanticClassMatch,
        ),
    ];

    for (element, tag) in candidates {
        let Some(element) = element else { continue };
        let text = clean_text(element);
        if text.chars().count() >= CONTAINER_MIN_CHARS {
            return (text, tag);
        }
    }

    if let Some(body) = document.select(&BODY).next() {
        let text = clean_text(body);
        if text.chars().count() >= BODY_MIN_CHARS {
            return (text, SourceTag::FallbackBody);
        }
    }

    (String::new(), SourceTag::None)
}

/// Text of `root` with noise descendants skipped: trimmed text nodes joined by newlines
pub fn clean_text(root: ElementRef) -> String {
    let mut parts = Vec::new();
    collect_text(root, &mut parts);
    parts.join("\n")
}

fn collect_text(element: ElementRef, out: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    if !is_noise(el) {
                        collect_text(el, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Whether an element is page chrome by tag, landmark role or class name
pub fn is_noise(element: ElementRef) -> bool {
    let el = element.value();
    if NOISE_TAGS.contains(&el.name()) {
        return true;
    }
    if let Some(role) = el.attr("role") {
        if NOISE_ROLES.contains(&role.to_lowercase().as_str()) {
            return true;
        }
    }
    if let Some(class) = el.attr("class") {
        let class = class.to_lowercase();
        if NOISE_CLASSES.iter().any(|noise| class.contains(noise)) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROSE: &str = "The committee met on Tuesday to review the proposal in detail. \
        Members raised several concerns about funding and timelines before voting.";

    fn run(html: &str) -> (String, SourceTag) {
        extract_semantic(&Html::parse_document(html))
    }

    #[test]
    fn test_article_wins() {
        let (text, tag) = run(&format!(
            "<body><main><p>{PROSE}</p></main><article><p>{PROSE}</p></article></body>"
        ));
        assert_eq!(tag, SourceTag::SemanticArticle);
        assert_eq!(text, PROSE);
    }

    #[test]
    fn test_short_article_falls_through_to_main() {
        let (_, tag) = run(&format!(
            "<body><article><p>Too short.</p></article><main><p>{PROSE}</p></main></body>"
        ));
        assert_eq!(tag, SourceTag::SemanticMain);
    }

    #[test]
    fn test_role_main_and_id_match() {
        let (_, tag) = run(&format!(r#"<body><div role="main"><p>{PROSE}</p></div></body>"#));
        assert_eq!(tag, SourceTag::SemanticRoleMain);

        let (_, tag) = run(&format!(r#"<body><div id="story-body"><p>{PROSE}</p></div></body>"#));
        assert_eq!(tag, SourceTag::SemanticIdMatch);
    }

    #[test]
    fn test_class_match() {
        let (_, tag) = run(&format!(r#"<body><div class="entry-body"><p>{PROSE}</p></div></body>"#));
        assert_eq!(tag, SourceTag::SemanticClassMatch);
    }

    #[test]
    fn test_noise_removed_inside_container() {
        let (text, tag) = run(&format!(
            r#"<body><article>
                <nav>Home | World | Sports</nav>
                <p>{PROSE}</p>
                <div class="Social-Share">Share on everything</div>
                <div role="complementary">Trending now</div>
                <script>var tracking = 1;</script>
            </article></body>"#
        ));
        assert_eq!(tag, SourceTag::SemanticArticle);
        assert!(!text.contains("Home | World"));
        assert!(!text.contains("Share on"));
        assert!(!text.contains("Trending"));
        assert!(!text.contains("tracking"));
    }

    #[test]
    fn test_body_fallback() {
        let (text, tag) = run(
            "<body><div><p>Just enough loose text in the body to pass the lower floor.</p></div>\
             <footer>Copyright</footer></body>",
        );
        assert_eq!(tag, SourceTag::FallbackBody);
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn test_nothing_found() {
        let (text, tag) = run("<body><div>tiny</div></body>");
        assert!(text.is_empty());
        assert_eq!(tag, SourceTag::None);
    }

    #[test]
    fn test_text_nodes_joined_by_newline() {
        let (text, _) = run(&format!("<body><article><h1>Title</h1><p>{PROSE}</p></article></body>"));
        assert!(text.starts_with("Title\n"));
    }
}
