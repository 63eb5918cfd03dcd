// Reference-data cache. Cities, themes and locations are small,
// slow-changing lookup collections shared by every search surface;
// each gets one entry with time-based expiry and stale-but-available
// semantics on a failed refresh.

use crate::client::{ApiError, HttpClient};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default entry lifetime: 5 minutes.
pub const CACHE_DURATION_MS: u64 = 300_000;

/// The reference collections the backend serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Cities,
    Themes,
    Locations,
}

impl ReferenceKind {
    pub fn path(&self) -> &'static str {
        match self {
            ReferenceKind::Cities => "/cities",
            ReferenceKind::Themes => "/themes",
            ReferenceKind::Locations => "/locations",
        }
    }

    pub const ALL: [ReferenceKind; 3] = [
        ReferenceKind::Cities,
        ReferenceKind::Themes,
        ReferenceKind::Locations,
    ];
}

/// One item of a reference collection. Immutable once fetched;
/// identity is `id`. `label` is optional on the wire, consumers fall
/// back to `name` for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl ReferenceItem {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Cache state for one collection. `cached_at` is set only on a
/// successful fetch; a failed refresh keeps both the previous items
/// and the previous `cached_at`.
#[derive(Debug, Default)]
struct CacheEntry {
    items: Vec<ReferenceItem>,
    cached_at: Option<Instant>,
    loading: bool,
    error: Option<String>,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        match self.cached_at {
            Some(at) => at.elapsed() < ttl && !self.items.is_empty(),
            None => false,
        }
    }
}

/// Read-only snapshot of an entry for callers that need failure or
/// in-flight visibility. `get_cached` alone never exposes errors.
#[derive(Debug, Clone, Default)]
pub struct EntrySnapshot {
    pub items: Vec<ReferenceItem>,
    pub loading: bool,
    pub error: Option<String>,
    pub fresh: bool,
}

#[derive(Debug, Default)]
struct CacheStats {
    fetches: AtomicUsize,
    fresh_skips: AtomicUsize,
    inflight_skips: AtomicUsize,
    errors: AtomicUsize,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

/// Snapshot of the cache counters.
#[derive(Debug, Default, Clone)]
pub struct CacheStatsReport {
    pub fetches: usize,
    pub fresh_skips: usize,
    pub inflight_skips: usize,
    pub errors: usize,
    pub hits: usize,
    pub misses: usize,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_millis(CACHE_DURATION_MS),
        }
    }
}

/// In-memory cache over the reference endpoints. Entries for different
/// collections are independent and may be fetched simultaneously; all
/// failures are converted to strings in the entry, never returned to
/// `get_cached` callers.
pub struct ReferenceDataCache {
    client: Arc<dyn HttpClient>,
    entries: DashMap<ReferenceKind, CacheEntry>,
    ttl: Duration,
    stats: CacheStats,
}

impl ReferenceDataCache {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self::with_config(client, CacheConfig::default())
    }

    pub fn with_config(client: Arc<dyn HttpClient>, config: CacheConfig) -> Self {
        Self {
            client,
            entries: DashMap::new(),
            ttl: config.ttl,
            stats: CacheStats::default(),
        }
    }

    /// Populates or refreshes the entry for `kind`. No-op while the
    /// entry is fresh or a fetch for it is already in flight, which
    /// keeps concurrently mounting consumers from issuing redundant
    /// network calls. Failures never propagate: they land in the
    /// entry's `error` field and the previous items stay available.
    pub async fn fetch(&self, kind: ReferenceKind) {
        {
            let mut entry = self.entries.entry(kind).or_default();
            if entry.loading {
                self.stats.inflight_skips.fetch_add(1, Ordering::SeqCst);
                return;
            }
            if entry.is_fresh(self.ttl) {
                self.stats.fresh_skips.fetch_add(1, Ordering::SeqCst);
                return;
            }
            // Marked before the await so concurrent readers observe the
            // in-flight state and later fetches for the same kind bail.
            entry.loading = true;
        }

        self.stats.fetches.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(path = kind.path(), "fetching reference collection");

        let result = self.client.get(kind.path(), &[]).await.and_then(|payload| {
            serde_json::from_value::<Vec<ReferenceItem>>(payload)
                .map_err(|e| ApiError::Decode(e.to_string()))
        });

        let mut entry = self.entries.entry(kind).or_default();
        match result {
            Ok(items) => {
                tracing::debug!(path = kind.path(), count = items.len(), "cache refreshed");
                entry.items = items;
                entry.cached_at = Some(Instant::now());
                entry.error = None;
            }
            Err(e) => {
                tracing::warn!(path = kind.path(), error = %e, "reference fetch failed");
                self.stats.errors.fetch_add(1, Ordering::SeqCst);
                // Stale-but-available: keep items and cached_at.
                entry.error = Some(e.to_string());
            }
        }
        entry.loading = false;
    }

    /// Current in-memory list for `kind`, empty if never fetched.
    /// Synchronous and infallible.
    pub fn get_cached(&self, kind: ReferenceKind) -> Vec<ReferenceItem> {
        match self.entries.get(&kind) {
            Some(entry) if !entry.items.is_empty() => {
                self.stats.hits.fetch_add(1, Ordering::SeqCst);
                entry.items.clone()
            }
            _ => {
                self.stats.misses.fetch_add(1, Ordering::SeqCst);
                Vec::new()
            }
        }
    }

    /// Snapshot of one entry, for callers that need to inspect the
    /// error or in-flight state explicitly.
    pub fn entry(&self, kind: ReferenceKind) -> EntrySnapshot {
        match self.entries.get(&kind) {
            Some(entry) => EntrySnapshot {
                items: entry.items.clone(),
                loading: entry.loading,
                error: entry.error.clone(),
                fresh: entry.is_fresh(self.ttl),
            },
            None => EntrySnapshot::default(),
        }
    }

    /// Fetches several collections concurrently. Entries are
    /// independent, so the fetches genuinely overlap.
    pub async fn warm(&self, kinds: &[ReferenceKind]) {
        futures::future::join_all(kinds.iter().map(|kind| self.fetch(*kind))).await;
    }

    /// Resets every entry to empty/uncached; the next `fetch` per kind
    /// hits the network regardless of timing.
    pub fn clear_cache(&self) {
        self.entries.clear();
        tracing::debug!("reference cache cleared");
    }

    pub fn stats(&self) -> CacheStatsReport {
        CacheStatsReport {
            fetches: self.stats.fetches.load(Ordering::SeqCst),
            fresh_skips: self.stats.fresh_skips.load(Ordering::SeqCst),
            inflight_skips: self.stats.inflight_skips.load(Ordering::SeqCst),
            errors: self.stats.errors.load(Ordering::SeqCst),
            hits: self.stats.hits.load(Ordering::SeqCst),
            misses: self.stats.misses.load(Ordering::SeqCst),
        }
    }
}
