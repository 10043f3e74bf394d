//! URL state tracked by the frontier
//!
//! A URL known to the frontier is either pending or crawled. `Crawled` is terminal:
//! once a URL reaches it, nothing moves it back.

use std::fmt;

/// Where a normalized URL currently sits in the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    /// Discovered and waiting in the pending list
    Pending,

    /// Handled by a worker; never crawled again
    Crawled,
}

impl UrlState {
    /// Name of the frontier collection that lists URLs in this state
    ///
    /// Pending URLs are listed by the ordered `queue`; `queue_set` only indexes them.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Pending => crate::frontier::QUEUE,
            Self::Crawled => crate::frontier::CRAWLED,
        }
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Crawled => "crawled",
        };
        write!(f, "{}", s)
    }
}
