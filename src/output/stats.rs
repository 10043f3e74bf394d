//! Statistics over the frontier and the dataset
//!
//! This module provides functionality for extracting and displaying the shared crawl
//! state: what is pending, what is crawled and how many records were stored.

use crate::dataset::Dataset;
use crate::frontier::Frontier;
use crate::state::UrlState;
use crate::SpiderError;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Entries in the pending list
    pub pending: u64,

    /// URLs in the crawled set
    pub crawled: u64,

    /// Records in the dataset
    pub stored: u64,

    /// Pending URLs in frontier order
    pub pending_urls: Vec<String>,

    /// Crawled URLs, sorted
    pub crawled_urls: Vec<String>,
}

impl CrawlStatistics {
    /// Share of crawled URLs that produced a stored record
    pub fn yield_rate(&self) -> f64 {
        if self.crawled == 0 {
            0.0
        } else {
            (self.stored as f64 / self.crawled as f64) * 100.0
        }
    }
}

/// Loads statistics from the frontier and the dataset
///
/// # Arguments
///
/// * `frontier` - The frontier to query
/// * `dataset` - The dataset to count
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(SpiderError)` - Failed to query a store
pub fn load_statistics(
    frontier: &dyn Frontier,
    dataset: &Dataset,
) -> Result<CrawlStatistics, SpiderError> {
    let pending_urls = frontier.dequeue_snapshot()?;

    let mut crawled_urls: Vec<String> = frontier.snapshot_crawled()?.into_iter().collect();
    crawled_urls.sort();

    Ok(CrawlStatistics {
        pending: frontier.pending_count()?,
        crawled: frontier.crawled_count()?,
        stored: dataset.len()?,
        pending_urls,
        crawled_urls,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `list_urls` - Also print every pending and crawled URL
pub fn print_statistics(stats: &CrawlStatistics, list_urls: bool) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pending URLs: {}", stats.pending);
    println!("  Crawled URLs: {}", stats.crawled);
    println!("  Stored records: {}", stats.stored);
    println!(
        "  Yield: {:.1}% of crawled pages stored",
        stats.yield_rate()
    );
    println!();

    if !list_urls {
        return;
    }

    for (state, urls) in [
        (UrlState::Pending, &stats.pending_urls),
        (UrlState::Crawled, &stats.crawled_urls),
    ] {
        println!("{}", url_list_heading(state, urls.len()));
        for url in urls {
            println!("  - {}", url);
        }
        println!();
    }
}

fn url_list_heading(state: UrlState, count: usize) -> String {
    format!("{} [{}] ({}):", state, state.collection(), count)
}
