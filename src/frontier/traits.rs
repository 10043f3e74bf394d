//! Frontier trait and error types
//!
//! This module defines the trait interface for frontier backends and the associated
//! error types.

use crate::state::UrlState;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during frontier operations
#[derive(Debug, Error)]
pub enum FrontierError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frontier state is inconsistent: {0}")]
    Inconsistent(String),
}

/// Result type for frontier operations
pub type FrontierResult<T> = Result<T, FrontierError>;

/// Trait for frontier backend implementations
///
/// Every method is a single atomic operation against the shared store. Callers must
/// not combine two calls and assume nothing happened in between: other workers and
/// other processes mutate the same store concurrently.
///
/// URLs are passed in raw form; implementations normalize them with
/// [`crate::url::normalize_url`] wherever a dedup key is needed.
pub trait Frontier: Send + Sync {
    // ===== Pending Management =====

    /// Adds a URL to the pending structures unless it is already pending or crawled
    ///
    /// The dedup check and both inserts (dedup set + ordered list) happen in one
    /// transaction.
    ///
    /// # Returns
    ///
    /// `true` if the URL was added, `false` if it was a duplicate
    fn enqueue(&self, url: &str) -> FrontierResult<bool>;

    /// Returns the whole pending list, oldest first, without removing anything
    ///
    /// Removal happens only through [`Frontier::remove_pending`] and
    /// [`Frontier::complete`], so a crash after a snapshot loses nothing.
    fn dequeue_snapshot(&self) -> FrontierResult<Vec<String>>;

    /// Removes a URL from the pending structures without marking it crawled
    ///
    /// This is the claim step a worker performs before extraction.
    fn remove_pending(&self, url: &str) -> FrontierResult<()>;

    /// Moves a URL to the crawled set, removing every pending trace of it
    ///
    /// Idempotent: completing an already crawled URL changes nothing.
    fn complete(&self, url: &str) -> FrontierResult<()>;

    // ===== Read Accessors =====

    /// Checks if a URL has been crawled
    fn is_crawled(&self, url: &str) -> FrontierResult<bool>;

    /// Returns every crawled URL (normalized)
    fn snapshot_crawled(&self) -> FrontierResult<HashSet<String>>;

    /// Reports where a URL currently sits, or `None` if the frontier does not know it
    fn state_of(&self, url: &str) -> FrontierResult<Option<UrlState>>;

    /// Number of entries in the pending list
    fn pending_count(&self) -> FrontierResult<u64>;

    /// Number of crawled URLs
    fn crawled_count(&self) -> FrontierResult<u64>;

    // ===== Administration =====

    /// Seeds the start URL if both pending and crawled are empty
    ///
    /// # Returns
    ///
    /// `true` if the frontier was empty and has been seeded
    fn ensure_start_url(&self, start_url: &str) -> FrontierResult<bool>;

    /// Wipes all frontier state
    fn clear(&self) -> FrontierResult<()>;
}
