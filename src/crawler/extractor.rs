//! Page extraction
//!
//! The crawler only needs one capability from the outside world: turn a URL into
//! [`PageData`]. [`Extractor`] is that seam; [`HttpExtractor`] is the production
//! implementation.

use crate::config::ExtractorConfig;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::parser::PageParser;
use crate::crawler::text::FilterSet;
use crate::{ConfigError, SpiderError};
use reqwest::Client;
use std::collections::BTreeSet;
use std::future::Future;
use thiserror::Error;
use url::Url;

/// Everything extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageData {
    /// Same-site links found on the page (absolute URLs)
    pub links: BTreeSet<String>,

    /// Favicon URL, if the page declares one
    pub favicon: Option<String>,

    /// Cleaned page title, empty if absent
    pub title: String,

    /// Cleaned headings in document order
    pub headings: Vec<String>,

    /// Cleaned paragraphs in document order
    pub content: Vec<String>,

    /// Keyword category tags
    pub filters: Vec<String>,
}

impl PageData {
    /// A page without title, headings or content has nothing worth storing
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.headings.is_empty() && self.content.is_empty()
    }
}

/// Errors that can occur while extracting a page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Not an HTML page (content type '{0}')")]
    NotHtml(String),

    #[error("Invalid page URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Turns a URL into page data
pub trait Extractor: Send + Sync {
    fn extract(&self, url: &str) -> impl Future<Output = Result<PageData, ExtractError>> + Send;
}

/// Extractor that fetches pages over HTTP and parses them with `scraper`
pub struct HttpExtractor {
    client: Client,
    parser: PageParser,
}

impl HttpExtractor {
    /// Builds an extractor from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(HttpExtractor)` - Client built and filters compiled
    /// * `Err(SpiderError)` - Client could not be built or a keyword failed to compile
    pub fn new(config: &ExtractorConfig) -> Result<Self, SpiderError> {
        let client = build_http_client(config)?;
        let filters = FilterSet::new(&config.filters)
            .map_err(|e| ConfigError::InvalidFilter(e.to_string()))?;

        Ok(Self {
            client,
            parser: PageParser::new(&config.skip_words, filters),
        })
    }
}

impl Extractor for HttpExtractor {
    async fn extract(&self, url: &str) -> Result<PageData, ExtractError> {
        let base_url = Url::parse(url)?;
        let body = fetch_page(&self.client, url).await?;
        Ok(self.parser.parse(&body, &base_url))
    }
}
