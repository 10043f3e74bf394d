//! Frontier module: the shared record of pending and crawled URLs
//!
//! This module holds the single source of truth for which URLs are waiting to be
//! crawled and which are done. Every crawler process opens the same store, so all
//! mutations go through the atomic operations of the [`Frontier`] trait:
//! - Enqueue with dedup against both pending and crawled URLs
//! - Non-destructive snapshots of the pending list for batch loading
//! - Claim (remove from pending) and complete (move to crawled)
//! - Bootstrap seeding of an empty frontier

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteFrontier;
pub use traits::{Frontier, FrontierError, FrontierResult};

use crate::config::FrontierConfig;
use crate::SpiderError;

/// Ordered list of pending URLs, raw form, oldest first
pub const QUEUE: &str = "queue";

/// Dedup index of pending URLs, normalized form
pub const QUEUE_SET: &str = "queue_set";

/// Set of crawled URLs, normalized form
pub const CRAWLED: &str = "crawled";

/// Opens the frontier store described by the configuration
///
/// Failing to open the frontier is fatal for a crawler process: there is no safe way
/// to crawl without it.
///
/// # Arguments
///
/// * `config` - Frontier location and busy timeout
///
/// # Returns
///
/// * `Ok(SqliteFrontier)` - Store opened and schema ensured
/// * `Err(SpiderError)` - Store could not be opened
pub fn open_frontier(config: &FrontierConfig) -> Result<SqliteFrontier, SpiderError> {
    Ok(SqliteFrontier::open(&config.database_path, config.busy_timeout())?)
}
