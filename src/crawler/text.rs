//! Text cleaning and keyword classification for extracted pages

use crate::config::FilterCategory;
use regex::Regex;
use scraper::ElementRef;
use std::collections::BTreeSet;

/// Tag every classified page carries
pub const ALL_FILTER: &str = "all";

/// Elements whose text never counts as page text
pub(crate) const IGNORED_SUBTREES: &[&str] = &["script", "style", "i"];

/// Collects the visible text of an element, one trimmed fragment per text node
///
/// `script`, `style` and `i` subtrees are skipped. Fragments are joined with a single
/// space.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut fragments = Vec::new();
    collect_text(element, &mut fragments);
    fragments.join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !IGNORED_SUBTREES.contains(&child_element.value().name()) {
                collect_text(child_element, out);
            }
        }
    }
}

/// Collapses whitespace and strips quote, plus and parenthesis characters
///
/// Returns `None` if nothing is left.
pub fn clean_text(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned: String = collapsed
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '+' | '(' | ')'))
        .collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// True for text made only of digits, whitespace and `| . , -`
pub fn is_numeric_text(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '|' | '.' | ',' | '-'))
}

/// Removes `:` and `=` from a page title and trims it
pub fn clean_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, ':' | '='))
        .collect::<String>()
        .trim()
        .to_string()
}

struct CompiledCategory {
    name: String,
    pattern: Regex,
}

/// Precompiled keyword categories
///
/// Each category matches any of its keywords as a whole word, case-insensitively.
pub struct FilterSet {
    categories: Vec<CompiledCategory>,
}

impl FilterSet {
    /// Compiles the configured categories
    pub fn new(categories: &[FilterCategory]) -> Result<Self, regex::Error> {
        let categories = categories
            .iter()
            .map(|category| {
                let alternatives = category
                    .keywords
                    .iter()
                    .map(|k| regex::escape(k.trim()))
                    .collect::<Vec<_>>()
                    .join("|");
                let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives))?;
                Ok(CompiledCategory {
                    name: category.category.clone(),
                    pattern,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { categories })
    }

    /// Tags a page from its headings and content
    ///
    /// A heading match adds `<category>-head`, a match in the joined content adds
    /// `<category>-cont`, and any match adds `all`. Without a match the result is
    /// `["all"]`. Tags come back sorted.
    pub fn classify(&self, headings: &[String], content: &[String]) -> Vec<String> {
        if headings.is_empty() && content.is_empty() {
            return vec![ALL_FILTER.to_string()];
        }

        let full_text = content.join(" ");
        let mut tags = BTreeSet::new();

        for category in &self.categories {
            if headings.iter().any(|h| category.pattern.is_match(h)) {
                tags.insert(format!("{}-head", category.name));
            }
            if category.pattern.is_match(&full_text) {
                tags.insert(format!("{}-cont", category.name));
            }
        }

        tags.insert(ALL_FILTER.to_string());
        tags.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn filters() -> FilterSet {
        FilterSet::new(&[
            FilterCategory {
                category: "exams".to_string(),
                keywords: vec!["exam".to_string(), "mid-sem".to_string()],
            },
            FilterCategory {
                category: "societies".to_string(),
                keywords: vec!["club".to_string()],
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(
            clean_text("  Hello \n  (World)  + \"x\" "),
            Some("Hello World  x".to_string())
        );
        assert_eq!(clean_text("   "), None);
        assert_eq!(clean_text("()"), None);
    }

    #[test]
    fn test_numeric_text() {
        assert!(is_numeric_text("2024"));
        assert!(is_numeric_text("1 | 2 | 3"));
        assert!(is_numeric_text("12.5, -3"));
        assert!(!is_numeric_text("Room 12"));
        assert!(!is_numeric_text(""));
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("  Home : Main = Page "), "Home  Main  Page");
        assert_eq!(clean_title(""), "");
    }

    #[test]
    fn test_element_text_skips_ignored_subtrees() {
        let html = Html::parse_fragment(
            "<h2>Exam <i>icon</i> schedule<script>var x;</script><span> now</span></h2>",
        );
        let selector = Selector::parse("h2").unwrap();
        let heading = html.select(&selector).next().unwrap();
        assert_eq!(element_text(heading), "Exam schedule now");
    }

    #[test]
    fn test_classify_heading_and_content() {
        let tags = filters().classify(
            &["Exam Schedule".to_string()],
            &["Join the chess club today".to_string()],
        );
        assert_eq!(tags, vec!["all", "exams-head", "societies-cont"]);
    }

    #[test]
    fn test_classify_word_boundaries() {
        let tags = filters().classify(&["Examination hall".to_string()], &[]);
        assert_eq!(tags, vec!["all"]);

        let tags = filters().classify(&["MID-SEM results".to_string()], &[]);
        assert_eq!(tags, vec!["all", "exams-head"]);
    }

    #[test]
    fn test_classify_empty_page() {
        assert_eq!(filters().classify(&[], &[]), vec!["all"]);
        assert_eq!(FilterSet::new(&[]).unwrap().classify(&["x".to_string()], &[]), vec!["all"]);
    }
}
