//! Frontier-Spider: a restartable, multi-worker domain crawler
//!
//! This crate crawls a bounded web domain with a pool of concurrent workers that share
//! a persistent frontier. A URL is crawled successfully at most once, across workers and
//! across process restarts, and every extracted page lands in a deduplicated dataset.

pub mod config;
pub mod crawler;
pub mod dataset;
pub mod frontier;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Frontier-Spider operations
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Frontier error: {0}")]
    Frontier(#[from] frontier::FrontierError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] dataset::DatasetError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid filter pattern: {0}")]
    InvalidFilter(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, Extractor, HttpExtractor, PageData, Spider};
pub use dataset::{CrawlRecord, Dataset};
pub use frontier::{Frontier, SqliteFrontier};
pub use state::UrlState;
pub use crate::url::{is_valid_url, normalize_url, site_domain, site_of_url};
