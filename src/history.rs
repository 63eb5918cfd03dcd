// Search history: a capped, newest-first list of completed search
// submissions. In-memory only, not persisted across reloads.

use crate::normalizer::SearchDomain;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

/// Maximum number of retained entries; older ones are silently evicted.
pub const HISTORY_CAP: usize = 50;

/// One completed search submission. Never mutated after creation; the
/// `filters` map holds the normalized (canonical) parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHistoryItem {
    pub id: String,
    pub domain: SearchDomain,
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub filters: HashMap<String, String>,
}

/// Append-only ring buffer of search submissions, newest first.
pub struct SearchHistory {
    entries: Mutex<VecDeque<SearchHistoryItem>>,
    cap: usize,
    next_id: AtomicU64,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::with_cap(HISTORY_CAP)
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(cap)),
            cap,
            next_id: AtomicU64::new(1),
        }
    }

    /// Records a completed submission at the head of the list,
    /// evicting the oldest entry beyond the cap. Returns the stored
    /// item.
    pub fn record(
        &self,
        domain: SearchDomain,
        query: &str,
        filters: HashMap<String, String>,
    ) -> SearchHistoryItem {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let item = SearchHistoryItem {
            id: format!("search-{id}"),
            domain,
            query: query.to_string(),
            timestamp: Utc::now(),
            filters,
        };

        let mut entries = self.entries.lock();
        entries.push_front(item.clone());
        entries.truncate(self.cap);
        item
    }

    /// Snapshot of the retained entries, newest first.
    pub fn recent(&self) -> Vec<SearchHistoryItem> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
