//! Integration tests for the worker pool and the per-URL crawl step
//!
//! Pages come from a scripted extractor so every scenario is deterministic; the
//! frontier and the dataset are real stores in a temporary directory.

use frontier_spider::config::CrawlerConfig;
use frontier_spider::crawler::{CrawlOutcome, Crawler, ExtractError, Extractor, PageData, Spider};
use frontier_spider::dataset::{CrawlRecord, Dataset};
use frontier_spider::frontier::{Frontier, FrontierError, FrontierResult, SqliteFrontier};
use frontier_spider::UrlState;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Serves canned pages and records every URL it was asked for
#[derive(Clone, Default)]
struct ScriptedExtractor {
    pages: Arc<HashMap<String, PageData>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedExtractor {
    fn new(pages: Vec<(&str, PageData)>) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|(url, page)| (url.to_string(), page))
                    .collect(),
            ),
            calls: Arc::default(),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Extractor for ScriptedExtractor {
    async fn extract(&self, url: &str) -> Result<PageData, ExtractError> {
        self.calls.lock().unwrap().push(url.to_string());
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.pages.get(url).cloned().ok_or(ExtractError::Status(404))
    }
}

/// Real frontier whose pending-list reads can be switched to fail
struct FlakyFrontier {
    inner: SqliteFrontier,
    broken: AtomicBool,
}

impl FlakyFrontier {
    fn break_reads(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }
}

impl Frontier for FlakyFrontier {
    fn enqueue(&self, url: &str) -> FrontierResult<bool> {
        self.inner.enqueue(url)
    }

    fn dequeue_snapshot(&self) -> FrontierResult<Vec<String>> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(FrontierError::Inconsistent("store unavailable".to_string()));
        }
        self.inner.dequeue_snapshot()
    }

    fn remove_pending(&self, url: &str) -> FrontierResult<()> {
        self.inner.remove_pending(url)
    }

    fn complete(&self, url: &str) -> FrontierResult<()> {
        self.inner.complete(url)
    }

    fn is_crawled(&self, url: &str) -> FrontierResult<bool> {
        self.inner.is_crawled(url)
    }

    fn snapshot_crawled(&self) -> FrontierResult<HashSet<String>> {
        self.inner.snapshot_crawled()
    }

    fn state_of(&self, url: &str) -> FrontierResult<Option<UrlState>> {
        self.inner.state_of(url)
    }

    fn pending_count(&self) -> FrontierResult<u64> {
        self.inner.pending_count()
    }

    fn crawled_count(&self) -> FrontierResult<u64> {
        self.inner.crawled_count()
    }

    fn ensure_start_url(&self, start_url: &str) -> FrontierResult<bool> {
        self.inner.ensure_start_url(start_url)
    }

    fn clear(&self) -> FrontierResult<()> {
        self.inner.clear()
    }
}

fn page(links: &[&str], title: &str, headings: &[&str], content: &[&str]) -> PageData {
    PageData {
        links: links.iter().map(|l| l.to_string()).collect(),
        title: title.to_string(),
        headings: headings.iter().map(|h| h.to_string()).collect(),
        content: content.iter().map(|c| c.to_string()).collect(),
        ..PageData::default()
    }
}

fn crawler_config(threads: usize) -> CrawlerConfig {
    CrawlerConfig {
        start_url: "http://a.test/".to_string(),
        number_of_threads: threads,
        excluded_suffixes: vec!["/home".to_string()],
        queue_capacity: 4,
        poll_interval_ms: 20,
    }
}

fn stores(dir: &TempDir) -> (Arc<SqliteFrontier>, Arc<Dataset>) {
    let frontier = SqliteFrontier::open(&dir.path().join("frontier.db"), Duration::from_secs(5))
        .expect("Failed to open frontier");
    let dataset = Dataset::open(&dir.path().join("data.db")).expect("Failed to open dataset");
    (Arc::new(frontier), Arc::new(dataset))
}

fn spider(
    frontier: &Arc<SqliteFrontier>,
    dataset: &Arc<Dataset>,
    extractor: &ScriptedExtractor,
) -> Spider<SqliteFrontier, ScriptedExtractor> {
    Spider::new(
        Arc::clone(frontier),
        Arc::clone(dataset),
        extractor.clone(),
        vec!["/home".to_string()],
    )
    .expect("Failed to create spider")
}

#[tokio::test]
async fn test_crawl_page_stores_record_and_enqueues_links() {
    let dir = TempDir::new().unwrap();
    let (frontier, dataset) = stores(&dir);
    frontier.ensure_start_url("http://a.test/").unwrap();

    let extractor = ScriptedExtractor::new(vec![(
        "http://a.test/",
        page(&["http://a.test/b"], "A", &["H1"], &["text"]),
    )]);
    let spider = spider(&frontier, &dataset, &extractor);

    let outcome = spider.crawl_page(0, "http://a.test/").await.unwrap();
    assert_eq!(outcome, CrawlOutcome::Stored);

    let records = dataset.read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, "http://a.test/");
    assert_eq!(records[0].title, "A");
    assert_eq!(records[0].headings, vec!["H1"]);
    assert_eq!(records[0].content, vec!["text"]);
    assert_eq!(records[0].filters, vec!["all"]);

    assert_eq!(frontier.dequeue_snapshot().unwrap(), vec!["http://a.test/b"]);
    assert!(frontier.snapshot_crawled().unwrap().contains("http://a.test"));
    assert!(spider.mirror().is_queued("http://a.test/b"));
}

#[tokio::test]
async fn test_mirror_is_seeded_with_pending_urls() {
    let dir = TempDir::new().unwrap();
    let (frontier, dataset) = stores(&dir);
    frontier.enqueue("http://a.test/p/").unwrap();
    frontier.complete("http://a.test/done").unwrap();

    let extractor = ScriptedExtractor::new(vec![]);
    let spider = spider(&frontier, &dataset, &extractor);

    assert!(spider.mirror().is_queued("http://a.test/p"));
    assert!(!spider.mirror().is_crawled("http://a.test/p"));
    assert!(spider.mirror().is_crawled("http://a.test/done/"));
    assert_eq!(spider.mirror().queued_len(), 1);

    spider.crawl_page(0, "http://a.test/p/").await.unwrap();
    assert!(!spider.mirror().is_queued("http://a.test/p"));
    assert!(spider.mirror().is_crawled("http://a.test/p"));
}

#[tokio::test]
async fn test_dataset_lock_wait_does_not_block_runtime() {
    let dir = TempDir::new().unwrap();
    let (frontier, dataset) = stores(&dir);
    frontier.enqueue("http://a.test/locked").unwrap();

    let extractor = ScriptedExtractor::new(vec![(
        "http://a.test/locked",
        page(&[], "Locked", &[], &[]),
    )]);
    let spider = spider(&frontier, &dataset, &extractor);

    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = {
        let ticks = Arc::clone(&ticks);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(10)).await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    let (locked_tx, locked_rx) = std::sync::mpsc::channel();
    let path = dir.path().join("data.db");
    let holder = std::thread::spawn(move || {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("BEGIN EXCLUSIVE").unwrap();
        locked_tx.send(()).unwrap();
        std::thread::sleep(Duration::from_millis(300));
        conn.execute_batch("COMMIT").unwrap();
    });
    locked_rx.recv().unwrap();

    let outcome = spider.crawl_page(0, "http://a.test/locked").await.unwrap();
    holder.join().unwrap();
    ticker.abort();

    assert_eq!(outcome, CrawlOutcome::Stored);
    assert!(dataset.contains("http://a.test/locked").unwrap());
    assert!(ticks.load(Ordering::SeqCst) >= 10);
}

#[tokio::test]
async fn test_empty_page_is_completed_without_record() {
    let dir = TempDir::new().unwrap();
    let (frontier, dataset) = stores(&dir);
    frontier.enqueue("http://a.test/blank").unwrap();

    let extractor = ScriptedExtractor::new(vec![(
        "http://a.test/blank",
        page(&["http://a.test/next"], "", &[], &[]),
    )]);
    let spider = spider(&frontier, &dataset, &extractor);

    let outcome = spider.crawl_page(0, "http://a.test/blank").await.unwrap();

    assert_eq!(outcome, CrawlOutcome::Empty);
    assert!(frontier.is_crawled("http://a.test/blank").unwrap());
    assert!(dataset.is_empty().unwrap());
    assert_eq!(frontier.dequeue_snapshot().unwrap(), vec!["http://a.test/next"]);
}

#[tokio::test]
async fn test_extraction_failure_still_completes() {
    let dir = TempDir::new().unwrap();
    let (frontier, dataset) = stores(&dir);
    frontier.enqueue("http://a.test/missing").unwrap();

    let extractor = ScriptedExtractor::new(vec![]);
    let spider = spider(&frontier, &dataset, &extractor);

    let outcome = spider.crawl_page(1, "http://a.test/missing").await.unwrap();

    assert_eq!(outcome, CrawlOutcome::Empty);
    assert!(frontier.is_crawled("http://a.test/missing").unwrap());
    assert_eq!(frontier.pending_count().unwrap(), 0);
}

#[tokio::test]
async fn test_already_crawled_and_excluded_are_not_fetched() {
    let dir = TempDir::new().unwrap();
    let (frontier, dataset) = stores(&dir);
    frontier.complete("http://a.test/done").unwrap();
    frontier.enqueue("http://a.test/home").unwrap();

    let extractor = ScriptedExtractor::new(vec![]);
    let spider = spider(&frontier, &dataset, &extractor);

    assert_eq!(
        spider.crawl_page(0, "http://a.test/done/").await.unwrap(),
        CrawlOutcome::AlreadyCrawled
    );
    assert_eq!(
        spider.crawl_page(0, "http://a.test/home").await.unwrap(),
        CrawlOutcome::Excluded
    );

    assert!(extractor.calls().is_empty());
    assert_eq!(frontier.pending_count().unwrap(), 0);
}

#[tokio::test]
async fn test_existing_record_is_not_overwritten() {
    let dir = TempDir::new().unwrap();
    let (frontier, dataset) = stores(&dir);
    frontier.enqueue("http://a.test/p").unwrap();

    let first = CrawlRecord::from_page("http://a.test/p", &page(&[], "First", &[], &[]));
    assert!(dataset.write(&first).unwrap());

    let extractor = ScriptedExtractor::new(vec![(
        "http://a.test/p",
        page(&[], "Second", &[], &["changed"]),
    )]);
    let spider = spider(&frontier, &dataset, &extractor);

    assert_eq!(
        spider.crawl_page(0, "http://a.test/p").await.unwrap(),
        CrawlOutcome::AlreadyStored
    );
    assert_eq!(dataset.read_all().unwrap(), vec![first]);
}

#[tokio::test]
async fn test_pool_crawls_until_frontier_is_empty() {
    let dir = TempDir::new().unwrap();
    let (frontier, dataset) = stores(&dir);
    frontier.ensure_start_url("http://a.test/").unwrap();

    let extractor = ScriptedExtractor::new(vec![
        (
            "http://a.test/",
            page(&["http://a.test/b", "http://a.test/c"], "Root", &[], &[]),
        ),
        (
            "http://a.test/b",
            page(&["http://a.test/", "http://a.test/d"], "B", &[], &[]),
        ),
        ("http://a.test/c", page(&[], "", &[], &[])),
        ("http://a.test/d", page(&["http://a.test/b/"], "", &["D"], &[])),
    ]);
    let crawler = Crawler::new(spider(&frontier, &dataset, &extractor), &crawler_config(3));

    let summary = tokio::time::timeout(
        Duration::from_secs(10),
        crawler.run(std::future::pending()),
    )
    .await
    .expect("Crawl did not finish");

    assert!(!summary.interrupted);
    assert_eq!(summary.batches, 3);
    assert_eq!(summary.dispatched, 4);

    let mut calls = extractor.calls();
    calls.sort();
    assert_eq!(
        calls,
        vec![
            "http://a.test/",
            "http://a.test/b",
            "http://a.test/c",
            "http://a.test/d"
        ]
    );

    assert_eq!(frontier.pending_count().unwrap(), 0);
    assert_eq!(frontier.crawled_count().unwrap(), 4);
    assert_eq!(dataset.len().unwrap(), 3);
    assert!(!dataset.contains("http://a.test/c").unwrap());
}

#[tokio::test]
async fn test_pool_with_empty_frontier_terminates() {
    let dir = TempDir::new().unwrap();
    let (frontier, dataset) = stores(&dir);

    let extractor = ScriptedExtractor::new(vec![]);
    let crawler = Crawler::new(spider(&frontier, &dataset, &extractor), &crawler_config(4));

    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        crawler.run(std::future::pending()),
    )
    .await
    .expect("Workers did not join");

    assert_eq!(summary.batches, 0);
    assert_eq!(summary.dispatched, 0);
    assert!(extractor.calls().is_empty());
}

#[tokio::test]
async fn test_pool_stops_when_pending_list_is_unreadable() {
    let dir = TempDir::new().unwrap();
    let (_, dataset) = stores(&dir);
    let inner = SqliteFrontier::open(&dir.path().join("frontier.db"), Duration::from_secs(5))
        .expect("Failed to open frontier");
    inner.ensure_start_url("http://a.test/").unwrap();

    let frontier = Arc::new(FlakyFrontier {
        inner,
        broken: AtomicBool::new(false),
    });
    let extractor = ScriptedExtractor::new(vec![("http://a.test/", page(&[], "A", &[], &[]))]);
    let spider = Spider::new(
        Arc::clone(&frontier),
        Arc::clone(&dataset),
        extractor.clone(),
        vec!["/home".to_string()],
    )
    .expect("Failed to create spider");
    frontier.break_reads();

    let crawler = Crawler::new(spider, &crawler_config(3));
    let summary = tokio::time::timeout(Duration::from_secs(5), crawler.run(std::future::pending()))
        .await
        .expect("Workers did not join");

    assert_eq!(summary.batches, 0);
    assert_eq!(summary.dispatched, 0);
    assert!(!summary.interrupted);
    assert!(extractor.calls().is_empty());
    assert_eq!(frontier.pending_count().unwrap(), 1);
}

#[tokio::test]
async fn test_interrupt_leaves_seed_pending() {
    let dir = TempDir::new().unwrap();
    let (frontier, dataset) = stores(&dir);
    frontier.ensure_start_url("http://a.test/").unwrap();

    let extractor = ScriptedExtractor::new(vec![(
        "http://a.test/",
        page(&[], "A", &[], &[]),
    )]);
    let crawler = Crawler::new(spider(&frontier, &dataset, &extractor), &crawler_config(2));

    let summary = tokio::time::timeout(Duration::from_secs(5), crawler.run(std::future::ready(())))
        .await
        .expect("Workers did not join after interrupt");

    assert!(summary.interrupted);
    assert!(extractor.calls().is_empty());
    assert_eq!(frontier.dequeue_snapshot().unwrap(), vec!["http://a.test/"]);
    assert!(!frontier.is_crawled("http://a.test/").unwrap());
    assert!(dataset.is_empty().unwrap());
}

#[tokio::test]
async fn test_restart_resumes_pending_urls() {
    let dir = TempDir::new().unwrap();
    let pages = vec![
        ("http://a.test/", page(&["http://a.test/b"], "A", &[], &[])),
        ("http://a.test/b", page(&[], "B", &[], &[])),
    ];

    {
        let (frontier, dataset) = stores(&dir);
        frontier.ensure_start_url("http://a.test/").unwrap();
        let extractor = ScriptedExtractor::new(pages.clone());
        let spider = spider(&frontier, &dataset, &extractor);
        spider.crawl_page(0, "http://a.test/").await.unwrap();
    }

    let (frontier, dataset) = stores(&dir);
    assert!(!frontier.ensure_start_url("http://a.test/").unwrap());

    let extractor = ScriptedExtractor::new(pages);
    let crawler = Crawler::new(spider(&frontier, &dataset, &extractor), &crawler_config(2));
    tokio::time::timeout(Duration::from_secs(10), crawler.run(std::future::pending()))
        .await
        .expect("Crawl did not finish");

    assert_eq!(extractor.calls(), vec!["http://a.test/b"]);
    assert_eq!(dataset.len().unwrap(), 2);
    assert_eq!(frontier.crawled_count().unwrap(), 2);
}

#[tokio::test]
async fn test_two_processes_share_one_frontier() {
    let dir = TempDir::new().unwrap();
    let (frontier, _) = stores(&dir);
    frontier.ensure_start_url("http://a.test/").unwrap();

    let pages: Vec<(&str, PageData)> = std::iter::once((
        "http://a.test/",
        page(
            &[
                "http://a.test/1",
                "http://a.test/2",
                "http://a.test/3",
                "http://a.test/4",
            ],
            "Root",
            &[],
            &[],
        ),
    ))
    .chain(
        ["http://a.test/1", "http://a.test/2", "http://a.test/3", "http://a.test/4"]
            .into_iter()
            .map(|url| (url, page(&["http://a.test/"], url, &[], &[]))),
    )
    .collect();

    let (frontier_a, dataset_a) = stores(&dir);
    let (frontier_b, dataset_b) = stores(&dir);
    let extractor_a = ScriptedExtractor::new(pages.clone());
    let extractor_b = ScriptedExtractor::new(pages);

    let crawler_a = Crawler::new(spider(&frontier_a, &dataset_a, &extractor_a), &crawler_config(2));
    let crawler_b = Crawler::new(spider(&frontier_b, &dataset_b, &extractor_b), &crawler_config(2));

    tokio::time::timeout(Duration::from_secs(10), async {
        tokio::join!(
            crawler_a.run(std::future::pending()),
            crawler_b.run(std::future::pending()),
        )
    })
    .await
    .expect("Crawlers did not finish");

    assert_eq!(frontier.pending_count().unwrap(), 0);
    assert_eq!(frontier.crawled_count().unwrap(), 5);

    let records = dataset_a.read_all().unwrap();
    assert_eq!(records.len(), 5);
    let mut urls: Vec<String> = records.into_iter().map(|r| r.url).collect();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), 5);
}
