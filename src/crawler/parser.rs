//! HTML parser for extracting links and page text
//!
//! This module turns a fetched HTML document into [`PageData`]:
//! - Same-site links to follow (from `<a>` tags)
//! - Favicon, title, headings and paragraphs
//! - Keyword category tags

use crate::crawler::text::{
    clean_text, clean_title, element_text, is_numeric_text, FilterSet, IGNORED_SUBTREES,
};
use crate::crawler::PageData;
use crate::url::{is_same_site, site_domain};
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeSet, HashSet};
use url::Url;

/// Page chrome whose headings and paragraphs are not page content
const CHROME_CONTAINERS: &[&str] = &["head", "header", "footer"];

/// Parses HTML documents into page data
pub struct PageParser {
    skip_words: Vec<String>,
    filters: FilterSet,
}

impl PageParser {
    /// Creates a parser
    ///
    /// # Arguments
    ///
    /// * `skip_words` - Anchor words that mark a paragraph as navigation
    /// * `filters` - Compiled keyword categories
    pub fn new(skip_words: &[String], filters: FilterSet) -> Self {
        Self {
            skip_words: skip_words.iter().map(|w| w.to_lowercase()).collect(),
            filters,
        }
    }

    /// Parses an HTML document fetched from `base_url`
    ///
    /// # Example
    ///
    /// ```
    /// use frontier_spider::crawler::{FilterSet, PageParser};
    /// use url::Url;
    ///
    /// let parser = PageParser::new(&[], FilterSet::new(&[]).unwrap());
    /// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
    /// let base_url = Url::parse("https://www.example.com/").unwrap();
    /// let page = parser.parse(html, &base_url);
    /// assert_eq!(page.title, "Test");
    /// assert!(page.links.contains("https://www.example.com/page"));
    /// ```
    pub fn parse(&self, html: &str, base_url: &Url) -> PageData {
        let document = Html::parse_document(html);

        let headings = extract_headings(&document);
        let content = self.extract_content(&document);
        let filters = self.filters.classify(&headings, &content);

        PageData {
            links: extract_links(&document, base_url),
            favicon: extract_favicon(&document, base_url),
            title: extract_title(&document),
            headings,
            content,
            filters,
        }
    }

    /// Extracts paragraph text, skipping paragraphs whose links read like navigation
    fn extract_content(&self, document: &Html) -> Vec<String> {
        let (Ok(p_selector), Ok(a_selector)) = (Selector::parse("p"), Selector::parse("a"))
        else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut content = Vec::new();

        for paragraph in document.select(&p_selector) {
            if in_ignored_container(paragraph) {
                continue;
            }

            let navigational = paragraph.select(&a_selector).any(|anchor| {
                let text = element_text(anchor).to_lowercase();
                self.skip_words.iter().any(|word| text.contains(word.as_str()))
            });
            if navigational {
                continue;
            }

            if let Some(text) = clean_text(&element_text(paragraph)) {
                if !is_numeric_text(&text) && seen.insert(text.clone()) {
                    content.push(text);
                }
            }
        }

        content
    }
}

/// True if the element sits inside page chrome or an ignored subtree
fn in_ignored_container(element: ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value().as_element().is_some_and(|e| {
            CHROME_CONTAINERS.contains(&e.name()) || IGNORED_SUBTREES.contains(&e.name())
        })
    })
}

/// Extracts the cleaned page title, empty if there is none
fn extract_title(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| clean_title(&element.text().collect::<String>()))
        .unwrap_or_default()
}

/// Extracts the first `<link>` whose rel mentions an icon
fn extract_favicon(document: &Html, base_url: &Url) -> Option<String> {
    let selector = Selector::parse("link[rel][href]").ok()?;

    document
        .select(&selector)
        .find(|element| {
            element
                .value()
                .attr("rel")
                .is_some_and(|rel| rel.to_lowercase().contains("icon"))
        })
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| base_url.join(href.trim()).ok())
        .map(|url| url.to_string())
}

/// Extracts h1-h6 headings in document order
///
/// Headings in page chrome, headings holding a button, empty and numeric headings
/// are skipped. Duplicates keep their first position.
fn extract_headings(document: &Html) -> Vec<String> {
    let (Ok(heading_selector), Ok(button_selector)) = (
        Selector::parse("h1, h2, h3, h4, h5, h6"),
        Selector::parse("button"),
    ) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut headings = Vec::new();

    for heading in document.select(&heading_selector) {
        if in_ignored_container(heading) || heading.select(&button_selector).next().is_some() {
            continue;
        }

        if let Some(text) = clean_text(&element_text(heading)) {
            if !is_numeric_text(&text) && seen.insert(text.clone()) {
                headings.push(text);
            }
        }
    }

    headings
}

/// Extracts same-site links from `<a href>` tags
fn extract_links(document: &Html, base_url: &Url) -> BTreeSet<String> {
    let mut links = BTreeSet::new();

    let Some(site) = base_url.host_str().map(site_domain) else {
        return links;
    };

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    if absolute_url
                        .host_str()
                        .is_some_and(|host| is_same_site(host, &site))
                    {
                        links.insert(absolute_url.to_string());
                    }
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - Empty and fragment-only hrefs
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    base_url
        .join(href)
        .ok()
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
}
