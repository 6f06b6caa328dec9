//! Frontier and referrer tracking
//!
//! This module owns the crawl's core state:
//! - FIFO queue of discovered, not-yet-processed URLs
//! - Visited set of URLs already dequeued
//! - Referrer map recording which page first led to each URL
//!
//! FIFO order gives a breadth-first traversal, and with it a reproducible
//! referrer attribution: the first page to discover a URL is its referrer.

use std::collections::{HashMap, HashSet, VecDeque};

/// Referrer recorded for the seed URL
pub const SEED_REFERRER: &str = "seed";

/// Referrer reported for a URL the tracker has never seen
pub const UNKNOWN_REFERRER: &str = "unknown";

/// Work queue, visited set and referrer map of one crawl run
///
/// All URLs are expected to be normalized already.
#[derive(Debug, Default)]
pub struct Frontier {
    /// URLs waiting to be processed, in discovery order
    queue: VecDeque<String>,

    /// Mirror of `queue` for constant-time membership checks
    queued: HashSet<String>,

    /// URLs already dequeued
    visited: HashSet<String>,

    /// URL -> page that first caused it to be enqueued
    referrers: HashMap<String, String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues the seed URL with the seed sentinel as its referrer
    pub fn seed(&mut self, url: &str) {
        self.enqueue(url, SEED_REFERRER);
    }

    /// Enqueues `url`, discovered on `referrer`, unless it is already known
    ///
    /// # Returns
    ///
    /// `true` if the URL was added, `false` if it was already queued or
    /// visited (in which case its recorded referrer is left untouched)
    pub fn offer(&mut self, url: &str, referrer: &str) -> bool {
        if self.visited.contains(url) || self.queued.contains(url) {
            return false;
        }
        self.enqueue(url, referrer);
        true
    }

    fn enqueue(&mut self, url: &str, referrer: &str) {
        self.referrers
            .entry(url.to_string())
            .or_insert_with(|| referrer.to_string());

        if self.queued.insert(url.to_string()) {
            self.queue.push_back(url.to_string());
        }
    }

    /// Dequeues the oldest URL and marks it visited
    ///
    /// # Returns
    ///
    /// * `Some(String)` - The next URL to process
    /// * `None` - The frontier is empty
    pub fn take_next(&mut self) -> Option<String> {
        let url = self.queue.pop_front()?;
        self.queued.remove(&url);
        self.visited.insert(url.clone());
        Some(url)
    }

    /// Returns the page that first led to `url`
    ///
    /// Falls back to [`UNKNOWN_REFERRER`] for URLs never offered.
    pub fn referrer_of(&self, url: &str) -> &str {
        self.referrers
            .get(url)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_REFERRER)
    }

    /// Returns the number of URLs waiting to be processed
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if no URLs are waiting
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of URLs dequeued so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Returns true if `url` has been dequeued
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Returns the waiting URLs in processing order
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }
}
