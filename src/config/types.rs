use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Frontier-Spider
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub frontier: FrontierConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// Worker pool and batch loader configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL seeded into an empty frontier
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Number of parallel workers draining the local queue
    #[serde(rename = "number-of-threads")]
    pub number_of_threads: usize,

    /// URLs ending with any of these suffixes are never crawled
    #[serde(rename = "excluded-suffixes", default = "default_excluded_suffixes")]
    pub excluded_suffixes: Vec<String>,

    /// Capacity of the local bounded queue
    #[serde(rename = "queue-capacity", default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// How long a worker waits on an empty queue before checking again (milliseconds)
    #[serde(rename = "poll-interval-ms", default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl CrawlerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Frontier store location and contention settings
#[derive(Debug, Clone, Deserialize)]
pub struct FrontierConfig {
    /// Path to the SQLite frontier file shared by all crawler processes
    #[serde(rename = "database-path")]
    pub database_path: PathBuf,

    /// How long a frontier operation waits for another process's lock (milliseconds)
    #[serde(rename = "busy-timeout-ms", default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl FrontierConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the crawl result dataset
    #[serde(rename = "data-path")]
    pub data_path: PathBuf,
}

/// Page extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Paragraphs whose links mention any of these words are dropped from content
    #[serde(rename = "skip-words", default = "default_skip_words")]
    pub skip_words: Vec<String>,

    /// Keyword categories used to tag pages
    #[serde(rename = "filter", default)]
    pub filters: Vec<FilterCategory>,
}

impl ExtractorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            skip_words: default_skip_words(),
            filters: Vec::new(),
        }
    }
}

/// A named group of keywords; a page matching one is tagged with the category
#[derive(Debug, Clone, Deserialize)]
pub struct FilterCategory {
    pub category: String,
    pub keywords: Vec<String>,
}

fn default_excluded_suffixes() -> Vec<String> {
    vec!["/home".to_string()]
}

fn default_queue_capacity() -> usize {
    256
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("frontier-spider/{}", env!("CARGO_PKG_VERSION"))
}

/// Anchor words marking navigation paragraphs ("read more", "click here", ...)
pub fn default_skip_words() -> Vec<String> {
    [
        "more", "show", "hide", "read", "click", "here", "link", "view", "details", "visit",
        "website", "download", "apply", "submit", "check", "explore", "register", "help",
        "feedback", "report", "next", "previous", "proceed", "expand", "collapse", "edit",
        "checkout",
    ]
    .iter()
    .map(|w| w.to_string())
    .collect()
}
