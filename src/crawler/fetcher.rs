//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made during extraction:
//! - Building the HTTP client with the configured user agent and timeout
//! - One GET per page, following redirects
//! - Rejecting error statuses and non-HTML responses

use crate::config::ExtractorConfig;
use crate::crawler::ExtractError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum redirect hops followed for a single page
pub const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The extractor configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ExtractorConfig) -> Result<Client, reqwest::Error> {
    let timeout = config.timeout();

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page body
///
/// | Condition | Result |
/// |-----------|--------|
/// | Transport failure, timeout, redirect overflow | `ExtractError::Http` |
/// | Non-2xx status | `ExtractError::Status` |
/// | Content-Type without `text/html` | `ExtractError::NotHtml` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, ExtractError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::Status(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();
    if !content_type.contains("text/html") {
        return Err(ExtractError::NotHtml(content_type));
    }

    Ok(response.text().await?)
}
