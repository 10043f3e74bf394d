//! Crawler coordinator - worker pool and batch loader
//!
//! This module runs one crawl to completion:
//! - Spawning a fixed pool of worker tasks
//! - Loading pending URLs from the frontier in batches
//! - Waiting for each batch to drain before loading the next
//! - Stopping the pool when the frontier is empty or on interrupt

use crate::config::CrawlerConfig;
use crate::crawler::queue::{Job, Poll, WorkQueue};
use crate::crawler::spider::Spider;
use crate::crawler::Extractor;
use crate::frontier::Frontier;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Totals reported when a crawl finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Batches loaded from the frontier
    pub batches: usize,

    /// URLs pushed onto the local queue
    pub dispatched: usize,

    /// The run stopped because of an interrupt rather than an empty frontier
    pub interrupted: bool,
}

/// Worker pool plus batch loader
pub struct Crawler<F, E> {
    spider: Arc<Spider<F, E>>,
    queue: Arc<WorkQueue>,
    number_of_threads: usize,
    poll_interval: Duration,
    interrupted: Arc<AtomicBool>,
    dispatched: AtomicUsize,
}

impl<F, E> Crawler<F, E>
where
    F: Frontier + 'static,
    E: Extractor + 'static,
{
    /// Creates a crawler
    ///
    /// # Arguments
    ///
    /// * `spider` - The per-URL crawl step shared by all workers
    /// * `config` - Worker count, local queue capacity and poll interval
    pub fn new(spider: Spider<F, E>, config: &CrawlerConfig) -> Self {
        Self {
            spider: Arc::new(spider),
            queue: Arc::new(WorkQueue::new(config.queue_capacity)),
            number_of_threads: config.number_of_threads.max(1),
            poll_interval: config.poll_interval(),
            interrupted: Arc::new(AtomicBool::new(false)),
            dispatched: AtomicUsize::new(0),
        }
    }

    /// Runs the crawl until the frontier is empty or `shutdown` resolves
    ///
    /// On shutdown the loader stops feeding at once. Workers finish the URL they are
    /// on; URLs still on the local queue are released unprocessed and stay pending in
    /// the frontier. Every worker has exited when this returns.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> CrawlSummary {
        let workers = self.spawn_workers();
        tokio::pin!(shutdown);

        let mut summary = CrawlSummary::default();

        loop {
            let batch = self.load_batch();
            if batch.is_empty() {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            }
            summary.batches += 1;

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    self.interrupted.store(true, Ordering::SeqCst);
                    summary.interrupted = true;
                    tracing::warn!("Interrupt received, draining workers");
                    break;
                }
                _ = self.feed_and_join(batch) => {}
            }
        }

        self.stop_workers(workers).await;
        summary.dispatched = self.dispatched.load(Ordering::SeqCst);

        tracing::info!(
            batches = summary.batches,
            dispatched = summary.dispatched,
            interrupted = summary.interrupted,
            "Crawl finished"
        );
        summary
    }

    fn spawn_workers(&self) -> Vec<JoinHandle<()>> {
        (0..self.number_of_threads)
            .map(|worker| {
                tokio::spawn(worker_loop(
                    worker,
                    Arc::clone(&self.spider),
                    Arc::clone(&self.queue),
                    Arc::clone(&self.interrupted),
                    self.poll_interval,
                ))
            })
            .collect()
    }

    /// Snapshots the pending list; a read failure counts as an empty frontier
    fn load_batch(&self) -> Vec<String> {
        match self.spider.frontier().dequeue_snapshot() {
            Ok(batch) => batch,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load pending URLs");
                Vec::new()
            }
        }
    }

    async fn feed_and_join(&self, batch: Vec<String>) {
        let count = batch.len();
        tracing::info!(count, "Loaded batch from frontier");

        for url in batch {
            if !self.queue.put(Job::Crawl(url)).await {
                tracing::error!("Local queue closed while loading batch");
                break;
            }
            self.dispatched.fetch_add(1, Ordering::SeqCst);
        }

        self.queue.join().await;
        tracing::debug!(count, "Batch drained");
    }

    async fn stop_workers(&self, workers: Vec<JoinHandle<()>>) {
        tracing::debug!(workers = workers.len(), "Stopping workers");

        for _ in 0..workers.len() {
            if !self.queue.put(Job::Stop).await {
                break;
            }
        }

        for handle in workers {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Worker task failed");
            }
        }
    }
}

async fn worker_loop<F, E>(
    worker: usize,
    spider: Arc<Spider<F, E>>,
    queue: Arc<WorkQueue>,
    interrupted: Arc<AtomicBool>,
    poll_interval: Duration,
) where
    F: Frontier + 'static,
    E: Extractor + 'static,
{
    tracing::debug!(worker, "Worker started");

    loop {
        let ticket = match queue.get(poll_interval).await {
            Poll::Ready(ticket) => ticket,
            Poll::Idle => continue,
        };

        let url = match ticket.job() {
            Job::Stop => break,
            Job::Crawl(url) => url.clone(),
        };

        if interrupted.load(Ordering::SeqCst) {
            tracing::debug!(worker, url = %url, "Interrupted, leaving URL pending");
            continue;
        }

        if let Err(e) = spider.crawl_page(worker, &url).await {
            tracing::error!(worker, url = %url, error = %e, "Frontier error while crawling");
        }
    }

    tracing::debug!(worker, "Worker stopped");
}
