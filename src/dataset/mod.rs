//! Dataset module: the deduplicated store of crawl results
//!
//! Every successfully extracted page becomes one [`CrawlRecord`]. Records are keyed by
//! URL and the first write for a URL wins; later writes are silent no-ops.

mod schema;
mod store;

pub use store::Dataset;

use crate::crawler::PageData;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timestamp format used for the `timestamp` column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur during dataset operations
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed list column: {0}")]
    Json(#[from] serde_json::Error),
}

impl DatasetError {
    /// Returns true if the error means the stored data cannot be read back
    ///
    /// Covers a file that is not a database, a damaged database, and a row whose list
    /// columns no longer hold JSON.
    pub fn is_corruption(&self) -> bool {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::NotADatabase | rusqlite::ErrorCode::DatabaseCorrupt
            ),
            Self::Json(_) => true,
            _ => false,
        }
    }
}

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// One persisted crawl result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRecord {
    pub url: String,
    pub favicon: Option<String>,
    pub title: String,
    pub headings: Vec<String>,
    pub content: Vec<String>,
    pub filters: Vec<String>,
    pub timestamp: String,
}

impl CrawlRecord {
    /// Builds a record for `url` from extracted page data, stamped with the local time
    pub fn from_page(url: &str, page: &PageData) -> Self {
        let filters = if page.filters.is_empty() {
            vec!["all".to_string()]
        } else {
            page.filters.clone()
        };

        Self {
            url: url.to_string(),
            favicon: page.favicon.clone(),
            title: page.title.clone(),
            headings: page.headings.clone(),
            content: page.content.clone(),
            filters,
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// A record without a URL carries nothing worth storing
    pub fn is_empty(&self) -> bool {
        self.url.is_empty()
    }
}
