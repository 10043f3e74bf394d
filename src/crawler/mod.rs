//! Crawler module for page extraction and crawl coordination
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and HTML parsing into page data
//! - The per-URL crawl step (claim, extract, enqueue links, store, complete)
//! - The bounded local queue with its join barrier
//! - The worker pool and batch loader

mod coordinator;
mod extractor;
mod fetcher;
mod mirror;
mod parser;
mod queue;
mod spider;
mod text;

pub use coordinator::{CrawlSummary, Crawler};
pub use extractor::{ExtractError, Extractor, HttpExtractor, PageData};
pub use fetcher::{build_http_client, fetch_page, MAX_REDIRECTS};
pub use mirror::FrontierMirror;
pub use parser::PageParser;
pub use queue::{Job, Poll, Ticket, WorkQueue};
pub use spider::{CrawlOutcome, Spider};
pub use text::FilterSet;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::frontier::{open_frontier, Frontier};
use crate::SpiderError;
use std::future::Future;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the frontier and the dataset
/// 2. Seed the start URL if the frontier is empty
/// 3. Build the HTTP extractor
/// 4. Run the worker pool until the frontier drains or `shutdown` resolves
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `shutdown` - Resolves when the crawl should stop early
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl finished or drained after an interrupt
/// * `Err(SpiderError)` - A store or the extractor could not be set up
pub async fn run_crawl(
    config: &Config,
    shutdown: impl Future<Output = ()>,
) -> Result<CrawlSummary, SpiderError> {
    let frontier = Arc::new(open_frontier(&config.frontier)?);
    let dataset = Arc::new(Dataset::open(&config.output.data_path)?);

    if frontier.ensure_start_url(&config.crawler.start_url)? {
        tracing::info!(url = %config.crawler.start_url, "Seeded empty frontier");
    }

    let extractor = HttpExtractor::new(&config.extractor)?;
    let spider = Spider::new(
        frontier,
        dataset,
        extractor,
        config.crawler.excluded_suffixes.clone(),
    )?;

    let crawler = Crawler::new(spider, &config.crawler);
    Ok(crawler.run(shutdown).await)
}
