//! URL handling module for Frontier-Spider
//!
//! This module provides the canonical dedup key for frontier entries, the syntactic
//! check applied to discovered links before they are enqueued, and the site-domain
//! derivation used to keep a crawl inside one domain.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{is_same_site, site_domain, site_of_url};
pub use normalize::{is_valid_url, normalize_url};
