//! Content recovery from JSON embedded in the page: framework hydration
//! state (Next.js, Nuxt) and schema.org JSON-LD blocks.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::source::SourceTag;

/// Minimum characters for a strategy to accept its text
pub const MIN_EMBEDDED_CHARS: usize = 100;

/// Recursion limit for [`deep_walk`]
pub const MAX_WALK_DEPTH: usize = 5;

/// Shortest string [`deep_walk`] keeps
pub const MIN_FRAGMENT_CHARS: usize = 20;

/// Keys harvested before any other value of an object
pub const HIGH_VALUE_KEYS: &[&str] = &[
    "body",
    "content",
    "text",
    "description",
    "articleBody",
    "abstract",
    "summary",
    "excerpt",
];

/// schema.org types treated as article-like (substring match on `@type`)
pub const ARTICLE_TYPES: &[&str] = &[
    "Article",
    "NewsArticle",
    "BlogPosting",
    "WebPage",
    "Report",
    "TechArticle",
    "ScholarlyArticle",
];

static NEXT_DATA: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script#__NEXT_DATA__").expect("selector"));
static NUXT_DATA: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script#__NUXT_DATA__").expect("selector"));
static SCRIPT: Lazy<Selector> = Lazy::new(|| Selector::parse("script").expect("selector"));
static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).expect("selector"));

static NUXT_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)window\.__NUXT__\s*=\s*(\{.+\})\s*;?\s*$").expect("Invalid nuxt regex")
});

/// Run all embedded-data strategies and keep the longest result
pub fn extract_embedded(document: &Html) -> Option<(String, SourceTag)> {
    let strategies: [fn(&Html) -> Option<(String, SourceTag)>; 3] =
        [extract_next_data, extract_nuxt_data, extract_json_ld];

    let mut best: Option<(String, SourceTag)> = None;
    for strategy in strategies {
        if let Some((text, tag)) = strategy(document) {
            let longer = best
                .as_ref()
                .map_or(true, |(current, _)| text.chars().count() > current.chars().count());
            if longer {
                best = Some((text, tag));
            }
        }
    }
    best
}

/// Next.js: `<script id="__NEXT_DATA__">` → `props.pageProps`
pub fn extract_next_data(document: &Html) -> Option<(String, SourceTag)> {
    let script = document.select(&NEXT_DATA).next()?;
    let raw: String = script.text().collect();
    let data: Value = match serde_json::from_str(&raw) {
        Ok(data) => data,
        Err(e) => {
            debug!("Failed to parse __NEXT_DATA__: {}", e);
            return None;
        }
    };

    let page_props = data.get("props").and_then(|p| p.get("pageProps"))?;
    accept(deep_walk(page_props), SourceTag::NextData)
}

/// Nuxt: `<script id="__NUXT_DATA__">` (Nuxt 3), else a `window.__NUXT__ = {...}`
/// assignment inside any script (Nuxt 2)
pub fn extract_nuxt_data(document: &Html) -> Option<(String, SourceTag)> {
    if let Some(script) = document.select(&NUXT_DATA).next() {
        let raw: String = script.text().collect();
        match serde_json::from_str::<Value>(&raw) {
            Ok(data) => {
                if let Some(found) = accept(deep_walk(&data), SourceTag::NuxtData) {
                    return Some(found);
                }
            }
            Err(e) => debug!("Failed to parse __NUXT_DATA__: {}", e),
        }
    }

    for script in document.select(&SCRIPT) {
        let raw: String = script.text().collect();
        if !raw.contains("__NUXT__") {
            continue;
        }
        let Some(captures) = NUXT_ASSIGNMENT.captures(&raw) else {
            continue;
        };
        match serde_json::from_str::<Value>(&captures[1]) {
            Ok(data) => {
                if let Some(found) = accept(deep_walk(&data), SourceTag::NuxtData) {
                    return Some(found);
                }
            }
            Err(e) => debug!("Failed to parse window.__NUXT__: {}", e),
        }
    }

    None
}

/// schema.org JSON-LD with an article-like `@type`
pub fn extract_json_ld(document: &Html) -> Option<(String, SourceTag)> {
    for script in document.select(&JSON_LD) {
        let raw: String = script.text().collect();
        if raw.trim().is_empty() {
            continue;
        }
        let data: Value = match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(e) => {
                debug!("Failed to parse JSON-LD: {}", e);
                continue;
            }
        };

        for item in flatten_jsonld(&data) {
            if !is_article_like(item) {
                continue;
            }
            let body = ["articleBody", "text"]
                .iter()
                .filter_map(|key| item.get(*key).and_then(Value::as_str))
                .find(|s| !s.is_empty());
            if let Some(body) = body {
                if body.chars().count() >= MIN_EMBEDDED_CHARS {
                    return Some((body.to_string(), SourceTag::JsonLd));
                }
            }
            if let Some(found) = accept(deep_walk(item), SourceTag::JsonLd) {
                return Some(found);
            }
        }
    }
    None
}

/// Objects of a JSON-LD block: the root, array members and `@graph` members
fn flatten_jsonld(json: &Value) -> Vec<&Value> {
    let mut items = Vec::new();
    match json {
        Value::Object(map) => {
            items.push(json);
            if let Some(Value::Array(graph)) = map.get("@graph") {
                for item in graph {
                    items.extend(flatten_jsonld(item));
                }
            }
        }
        Value::Array(arr) => {
            for item in arr {
                items.extend(flatten_jsonld(item));
            }
        }
        _ => {}
    }
    items
}

fn is_article_like(item: &Value) -> bool {
    let declared = match item.get("@type") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        _ => return false,
    };
    ARTICLE_TYPES.iter().any(|t| declared.contains(t))
}

fn accept(text: String, tag: SourceTag) -> Option<(String, SourceTag)> {
    (text.chars().count() >= MIN_EMBEDDED_CHARS).then_some((text, tag))
}

/// Collect prose-looking strings from nested JSON.
///
/// High-value keys of each object are harvested first, then every other
/// value is visited. Recursion stops at [`MAX_WALK_DEPTH`].
pub fn deep_walk(value: &Value) -> String {
    walk(value, MAX_WALK_DEPTH)
}

fn walk(value: &Value, depth: usize) -> String {
    if depth == 0 {
        return String::new();
    }

    let mut texts: Vec<String> = Vec::new();
    match value {
        Value::String(s) => {
            if looks_like_content(s) {
                texts.push(s.clone());
            }
        }
        Value::Object(map) => {
            let mut harvested: Vec<&str> = Vec::new();
            for key in HIGH_VALUE_KEYS {
                if let Some(Value::String(s)) = map.get(*key) {
                    if looks_like_content(s) {
                        texts.push(s.clone());
                        harvested.push(key);
                    }
                }
            }
            for (key, child) in map {
                if harvested.contains(&key.as_str()) {
                    continue;
                }
                texts.push(walk(child, depth - 1));
            }
        }
        Value::Array(items) => {
            for item in items {
                texts.push(walk(item, depth - 1));
            }
        }
        _ => {}
    }

    texts.retain(|t| !t.is_empty());
    texts.join("\n")
}

/// Long enough, and not a link or inline data
fn looks_like_content(s: &str) -> bool {
    s.chars().count() >= MIN_FRAGMENT_CHARS
        && !s.starts_with("http://")
        && !s.starts_with("https://")
        && !s.starts_with("data:")
        && !s.starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BODY_150: &str = "Researchers announced on Monday that the new battery design retains \
        ninety percent of its capacity after two thousand cycles in lab tests.";

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_deep_walk_skips_urls_and_short_strings() {
        let value = json!({
            "title": "short",
            "image": "https://cdn.example.com/a-very-long-image-url.png",
            "inline": "data:image/png;base64,AAAAAAAAAAAAAAAAAAAAAAAA",
            "path": "/articles/some-long-relative-path-here",
            "body": "This string is long enough to be kept by the walker."
        });
        assert_eq!(deep_walk(&value), "This string is long enough to be kept by the walker.");
    }

    #[test]
    fn test_deep_walk_harvests_high_value_keys_first() {
        let value = json!({
            "aaa": "An early key that sorts before the body field.",
            "summary": "The summary field is a high value key for harvesting."
        });
        let text = deep_walk(&value);
        assert!(text.starts_with("The summary field"));
        assert_eq!(text.matches("The summary field").count(), 1);
    }

    #[test]
    fn test_deep_walk_depth_limit() {
        let deep = json!({"a": {"b": {"c": {"d": {"e": {"f": "Too deep to ever be collected by the walker."}}}}}});
        assert_eq!(deep_walk(&deep), "");

        let shallow = json!({"a": {"b": {"c": {"d": "Shallow enough to be collected by the walker."}}}});
        assert_eq!(deep_walk(&shallow), "Shallow enough to be collected by the walker.");
    }

    #[test]
    fn test_next_data_page_props() {
        let payload = json!({"props": {"pageProps": {"post": {"body": BODY_150}}}, "page": "/x"});
        let html = format!(
            r#"<html><body><div id="__next"></div><script id="__NEXT_DATA__" type="application/json">{}</script></body></html>"#,
            payload
        );
        let (text, tag) = extract_next_data(&doc(&html)).unwrap();
        assert_eq!(tag, SourceTag::NextData);
        assert_eq!(text, BODY_150);
    }

    #[test]
    fn test_next_data_malformed_is_empty() {
        let html = r#"<script id="__NEXT_DATA__">{"props": </script>"#;
        assert!(extract_next_data(&doc(html)).is_none());
    }

    #[test]
    fn test_nuxt3_script() {
        let payload = json!([{"data": {"article": {"content": BODY_150}}}]);
        let html = format!(r#"<script id="__NUXT_DATA__" type="application/json">{}</script>"#, payload);
        let (_, tag) = extract_nuxt_data(&doc(&html)).unwrap();
        assert_eq!(tag, SourceTag::NuxtData);
    }

    #[test]
    fn test_nuxt2_assignment() {
        let payload = json!({"data": [{"story": {"text": BODY_150}}]});
        let html = format!("<script>window.__NUXT__ = {};\n</script>", payload);
        let (text, tag) = extract_nuxt_data(&doc(&html)).unwrap();
        assert_eq!(tag, SourceTag::NuxtData);
        assert_eq!(text, BODY_150);
    }

    #[test]
    fn test_json_ld_article_body() {
        let payload = json!({"@context": "https://schema.org", "@type": "NewsArticle", "articleBody": BODY_150});
        let html = format!(r#"<script type="application/ld+json">{}</script>"#, payload);
        let (text, tag) = extract_json_ld(&doc(&html)).unwrap();
        assert_eq!(tag, SourceTag::JsonLd);
        assert_eq!(text, BODY_150);
    }

    #[test]
    fn test_json_ld_graph_and_type_list() {
        let payload = json!({"@graph": [
            {"@type": "Organization", "description": BODY_150},
            {"@type": ["BlogPosting", "CreativeWork"], "abstract": BODY_150}
        ]});
        let html = format!(r#"<script type="application/ld+json">{}</script>"#, payload);
        let (text, _) = extract_json_ld(&doc(&html)).unwrap();
        assert_eq!(text, BODY_150);
    }

    #[test]
    fn test_json_ld_top_level_array() {
        let payload = json!([
            {"@type": "BreadcrumbList", "itemListElement": []},
            {"@type": "Article", "articleBody": BODY_150}
        ]);
        let html = format!(r#"<script type="application/ld+json">{}</script>"#, payload);
        let (text, tag) = extract_json_ld(&doc(&html)).unwrap();
        assert_eq!(tag, SourceTag::JsonLd);
        assert_eq!(text, BODY_150);
    }

    #[test]
    fn test_json_ld_graph_skips_non_article_nodes() {
        let org_blurb = "Example Media Group publishes regional news, features and opinion across \
                         print and digital editions, and has done so for more than forty years now.";
        let payload = json!({"@context": "https://schema.org", "@graph": [
            {"@type": "Organization", "name": "Example Media", "description": org_blurb},
            {"@type": "Person", "name": "Jane Doe", "description": org_blurb},
            {"@type": "NewsArticle", "headline": "Transit", "articleBody": BODY_150}
        ]});
        let html = format!(r#"<script type="application/ld+json">{}</script>"#, payload);
        let (text, _) = extract_json_ld(&doc(&html)).unwrap();
        assert_eq!(text, BODY_150);
    }

    #[test]
    fn test_json_ld_ignores_products() {
        let payload = json!({"@type": "Product", "description": BODY_150});
        let html = format!(r#"<script type="application/ld+json">{}</script>"#, payload);
        assert!(extract_json_ld(&doc(&html)).is_none());
    }

    #[test]
    fn test_longest_strategy_wins() {
        let long = format!("{} {}", BODY_150, BODY_150);
        let next = json!({"props": {"pageProps": {"body": BODY_150}}});
        let ld = json!({"@type": "Article", "articleBody": long});
        let html = format!(
            r#"<script id="__NEXT_DATA__">{}</script><script type="application/ld+json">{}</script>"#,
            next, ld
        );
        let (text, tag) = extract_embedded(&doc(&html)).unwrap();
        assert_eq!(tag, SourceTag::JsonLd);
        assert_eq!(text, long);
    }

    #[test]
    fn test_nothing_embedded() {
        assert!(extract_embedded(&doc("<html><body><p>hi</p></body></html>")).is_none());
    }
}
