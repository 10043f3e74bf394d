//! Output module for inspecting and exporting crawl state
//!
//! This module handles:
//! - Frontier and dataset statistics
//! - Exporting the dataset as JSON Lines

mod export;
pub mod stats;

pub use export::{export_jsonl, write_jsonl};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
