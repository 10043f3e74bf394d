//! Configuration module for Frontier-Spider
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use frontier_spider::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("spider.toml")).unwrap();
//! println!("Crawling {} with {} workers", config.crawler.start_url, config.crawler.number_of_threads);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_skip_words, Config, CrawlerConfig, ExtractorConfig, FilterCategory, FrontierConfig,
    OutputConfig,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
