use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("Invalid title selector"));

static META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta").expect("Invalid meta selector"));

/// Head-tag metadata of a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub site_name: Option<String>,
    pub published_time: Option<String>,
}

impl PageMetadata {
    /// Best title for display: OG title, then `<title>`
    pub fn display_title(&self) -> Option<&str> {
        self.og_title.as_deref().or(self.title.as_deref())
    }

    pub fn has_title(&self) -> bool {
        self.title.is_some() || self.og_title.is_some()
    }

    pub fn has_description(&self) -> bool {
        self.description.is_some() || self.og_description.is_some()
    }

    pub fn has_attribution(&self) -> bool {
        self.author.is_some() || self.published_time.is_some()
    }
}

/// Read `<title>` and `<meta>` tags. Absent tags leave fields empty.
pub fn extract_metadata(document: &Html) -> PageMetadata {
    let mut meta = PageMetadata::default();

    if let Some(title) = document.select(&TITLE_SELECTOR).next() {
        let text = title.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            meta.title = Some(text);
        }
    }

    for tag in document.select(&META_SELECTOR) {
        let el = tag.value();
        let name = el
            .attr("name")
            .filter(|n| !n.is_empty())
            .or_else(|| el.attr("property"))
            .unwrap_or("")
            .to_lowercase();
        let content = match el.attr("content") {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => continue,
        };

        let slot = match name.as_str() {
            "description" => &mut meta.description,
            "author" => &mut meta.author,
            "og:title" => &mut meta.og_title,
            "og:description" => &mut meta.og_description,
            "og:image" => &mut meta.og_image,
            "og:site_name" => &mut meta.site_name,
            "article:published_time" | "pubdate" | "publishdate" => &mut meta.published_time,
            _ => continue,
        };
        *slot = Some(content);
    }

    meta
}
