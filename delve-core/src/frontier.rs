// Breadth-first frontier and the set of already-expanded directories

use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: usize,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// FIFO queue of `(url, depth)` pairs. Entries are pushed at the tail and popped
/// from the head, so every depth-`d` entry is consumed before any depth-`d+1` one.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
}

impl Frontier {
    pub fn with_root(url: impl Into<String>) -> Self {
        let mut frontier = Self::default();
        frontier.push(FrontierEntry::new(url, 1));
        frontier
    }

    pub fn push(&mut self, entry: FrontierEntry) {
        self.queue.push_back(entry);
    }

    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Strip trailing slashes so `/admin` and `/admin/` are the same directory.
pub fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Append-only set of normalized URLs that were taken as a root or enqueued.
#[derive(Debug, Default)]
pub struct DiscoveredSet {
    urls: HashSet<String>,
}

impl DiscoveredSet {
    /// Returns `true` when the URL was not present before.
    pub fn insert(&mut self, url: &str) -> bool {
        self.urls.insert(normalize_url(url))
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(&normalize_url(url))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
