//! Per-URL crawl step shared by all workers

use crate::crawler::mirror::FrontierMirror;
use crate::crawler::{Extractor, PageData};
use crate::dataset::{CrawlRecord, Dataset};
use crate::frontier::{Frontier, FrontierResult};
use crate::url::{is_valid_url, normalize_url};
use std::sync::Arc;

/// What happened to a URL handed to [`Spider::crawl_page`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// This process already crawled it; nothing fetched
    AlreadyCrawled,

    /// Matched an excluded suffix; retired without fetching
    Excluded,

    /// Fetched, but the page had no title, headings or content
    Empty,

    /// Fetched and written to the dataset
    Stored,

    /// Fetched, but the dataset already held a record for it
    AlreadyStored,

    /// Fetched, but the dataset write failed
    WriteFailed,
}

/// Crawls single URLs against the shared frontier and dataset
pub struct Spider<F, E> {
    frontier: Arc<F>,
    dataset: Arc<Dataset>,
    extractor: E,
    mirror: FrontierMirror,
    excluded_suffixes: Vec<String>,
}

impl<F: Frontier, E: Extractor> Spider<F, E> {
    /// Creates a spider, seeding its mirror from the frontier's crawled and pending URLs
    pub fn new(
        frontier: Arc<F>,
        dataset: Arc<Dataset>,
        extractor: E,
        excluded_suffixes: Vec<String>,
    ) -> FrontierResult<Self> {
        let crawled = frontier.snapshot_crawled()?;
        let queued = frontier.dequeue_snapshot()?;
        tracing::debug!(
            crawled = crawled.len(),
            queued = queued.len(),
            "Loaded frontier into mirror"
        );

        Ok(Self {
            frontier,
            dataset,
            extractor,
            mirror: FrontierMirror::new(crawled, queued),
            excluded_suffixes,
        })
    }

    pub fn frontier(&self) -> &Arc<F> {
        &self.frontier
    }

    pub fn mirror(&self) -> &FrontierMirror {
        &self.mirror
    }

    fn is_excluded(&self, url: &str) -> bool {
        let key = normalize_url(url);
        self.excluded_suffixes
            .iter()
            .any(|suffix| url.ends_with(suffix.as_str()) || key.ends_with(suffix.as_str()))
    }

    /// Crawls one URL
    ///
    /// The URL is claimed before extraction and completed afterwards, whether or not
    /// the page yielded data. Extraction and dataset failures are logged and absorbed;
    /// only frontier failures during claim or completion are returned.
    pub async fn crawl_page(&self, worker: usize, url: &str) -> FrontierResult<CrawlOutcome> {
        if self.mirror.is_crawled(url) {
            tracing::debug!(worker, url, "Already crawled, skipping");
            self.frontier.complete(url)?;
            return Ok(CrawlOutcome::AlreadyCrawled);
        }

        if self.is_excluded(url) {
            tracing::debug!(worker, url, "Excluded suffix, retiring without fetch");
            self.frontier.complete(url)?;
            self.mirror.mark_crawled(url);
            return Ok(CrawlOutcome::Excluded);
        }

        self.frontier.remove_pending(url)?;
        self.mirror.mark_claimed(url);
        tracing::info!(
            worker,
            url,
            queued = self.mirror.queued_len(),
            crawled = self.mirror.crawled_len(),
            "Crawling"
        );

        let page = match self.extractor.extract(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(worker, url, error = %e, "Extraction failed");
                PageData::default()
            }
        };

        self.enqueue_links(worker, &page);

        let outcome = if page.is_empty() {
            tracing::info!(worker, url, "Empty page, nothing to store");
            CrawlOutcome::Empty
        } else {
            self.store(worker, url, &page).await
        };

        self.frontier.complete(url)?;
        self.mirror.mark_crawled(url);
        tracing::debug!(worker, url, ?outcome, "Completed");

        Ok(outcome)
    }

    fn enqueue_links(&self, worker: usize, page: &PageData) {
        let mut added = 0usize;

        for link in &page.links {
            if self.mirror.is_crawled(link) || !is_valid_url(link) {
                continue;
            }

            match self.frontier.enqueue(link) {
                Ok(true) => {
                    self.mirror.mark_queued(link);
                    added += 1;
                }
                Ok(false) => tracing::trace!(worker, url = %link, "Duplicate link"),
                Err(e) => tracing::warn!(worker, url = %link, error = %e, "Enqueue failed"),
            }
        }

        if added > 0 {
            tracing::debug!(worker, count = added, "Enqueued new links");
        }
    }

    /// Writes the record on the blocking pool; the dataset lock can wait on other processes
    async fn store(&self, worker: usize, url: &str, page: &PageData) -> CrawlOutcome {
        let record = CrawlRecord::from_page(url, page);
        let dataset = Arc::clone(&self.dataset);

        match tokio::task::spawn_blocking(move || dataset.write(&record)).await {
            Ok(Ok(true)) => {
                tracing::debug!(worker, url, "Stored record");
                CrawlOutcome::Stored
            }
            Ok(Ok(false)) => CrawlOutcome::AlreadyStored,
            Ok(Err(e)) => {
                tracing::error!(worker, url, error = %e, "Dataset write failed");
                CrawlOutcome::WriteFailed
            }
            Err(e) => {
                tracing::error!(worker, url, error = %e, "Dataset write task failed");
                CrawlOutcome::WriteFailed
            }
        }
    }
}
