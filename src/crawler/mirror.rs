//! Per-process cache of frontier membership
//!
//! Workers consult the mirror before touching the shared store. It is loaded once at
//! startup and updated on every mutation this process makes, so it never sees
//! another process's progress. It only short-circuits work; the frontier's own
//! operations stay authoritative.

use crate::url::normalize_url;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MirrorSets {
    crawled: HashSet<String>,
    queued: HashSet<String>,
}

/// Crawled and queued URL sets, keyed by normalized URL
#[derive(Debug, Default)]
pub struct FrontierMirror {
    sets: Mutex<MirrorSets>,
}

impl FrontierMirror {
    /// Creates a mirror seeded with the frontier's crawled and pending URLs
    ///
    /// Both sets are normalized on the way in.
    pub fn new(
        crawled: impl IntoIterator<Item = String>,
        queued: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            sets: Mutex::new(MirrorSets {
                crawled: crawled.into_iter().map(|u| normalize_url(&u)).collect(),
                queued: queued.into_iter().map(|u| normalize_url(&u)).collect(),
            }),
        }
    }

    fn sets(&self) -> MutexGuard<'_, MirrorSets> {
        self.sets.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_crawled(&self, url: &str) -> bool {
        self.sets().crawled.contains(&normalize_url(url))
    }

    pub fn is_queued(&self, url: &str) -> bool {
        self.sets().queued.contains(&normalize_url(url))
    }

    /// Records a URL this process enqueued
    pub fn mark_queued(&self, url: &str) {
        self.sets().queued.insert(normalize_url(url));
    }

    /// Records a URL this process claimed
    pub fn mark_claimed(&self, url: &str) {
        self.sets().queued.remove(&normalize_url(url));
    }

    /// Records a URL this process completed
    pub fn mark_crawled(&self, url: &str) {
        let key = normalize_url(url);
        let mut sets = self.sets();
        sets.queued.remove(&key);
        sets.crawled.insert(key);
    }

    /// Number of crawled URLs known to this process
    pub fn crawled_len(&self) -> usize {
        self.sets().crawled.len()
    }

    /// Number of pending URLs known to this process
    pub fn queued_len(&self) -> usize {
        self.sets().queued.len()
    }
}
