// Paginated search over the places-of-interest endpoints. One fetcher
// instance owns the accumulated result list for exactly one filter
// combination; any criteria change replaces the list from offset 0 so
// results from different filters are never mixed.

use crate::client::{ApiError, HttpClient};
use crate::reference_cache::{ReferenceDataCache, ReferenceItem, ReferenceKind};
use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Flat set of optional filters. Value equality between two criteria
/// decides whether pagination must reset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub query: Option<String>,
    pub category: Option<String>,
    pub state: Option<String>,
    pub city_id: Option<String>,
    pub theme_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub guests: Option<u32>,
}

impl FilterCriteria {
    /// Local precondition check, run before any network call. Errors
    /// are field-scoped so forms can block submission in place.
    pub fn validate(&self) -> Result<(), ApiError> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if to < from {
                return Err(ApiError::validation(
                    "dateTo",
                    "End date must not be before start date",
                ));
            }
        }
        Ok(())
    }

    /// Query pairs for the present filters. Absent filters are simply
    /// omitted, never sent as empty strings.
    fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                params.push((key.to_string(), value));
            }
        };
        push("q", self.query.clone());
        push("category", self.category.clone());
        push("state", self.state.clone());
        push("cityId", self.city_id.clone());
        push("themeId", self.theme_id.clone());
        push("dateFrom", self.date_from.map(|d| d.to_string()));
        push("dateTo", self.date_to.map(|d| d.to_string()));
        push("guests", self.guests.map(|g| g.to_string()));
        params
    }
}

/// The three paginated search routes of the places-of-interest API.
#[derive(Debug, Clone)]
pub enum SearchRoute {
    /// `GET /places-of-interest/search?q=&category=&state=`
    Query,
    /// `GET /places-of-interest/categories/{slug}?state=`
    Category { slug: String },
    /// `GET /places-of-interest/states/{state}/cities/{city}/monuments`
    CityMonuments { state: String, city: String },
}

impl SearchRoute {
    fn path(&self) -> String {
        match self {
            SearchRoute::Query => "/places-of-interest/search".to_string(),
            SearchRoute::Category { slug } => {
                format!("/places-of-interest/categories/{slug}")
            }
            SearchRoute::CityMonuments { state, city } => {
                format!("/places-of-interest/states/{state}/cities/{city}/monuments")
            }
        }
    }

    /// Criteria filters that travel in the query string for this
    /// route. The city-monuments route carries everything in the path.
    fn filter_params(&self, criteria: &FilterCriteria) -> Vec<(String, String)> {
        match self {
            SearchRoute::Query => criteria.query_params(),
            SearchRoute::Category { .. } => {
                let mut params = criteria.query_params();
                params.retain(|(key, _)| key == "state");
                params
            }
            SearchRoute::CityMonuments { .. } => Vec::new(),
        }
    }
}

/// One place-of-interest result row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// One page as the server returns it. `has_more` is authoritative from
/// here, never derived locally from `offset < total`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub category: Option<String>,
    pub monuments: Vec<Monument>,
    pub total: usize,
    pub has_more: bool,
}

/// Fetch state machine: `Idle -> Loading -> {Loaded, Failed}` and
/// `Loaded -> LoadingMore -> Loaded` (a failed append returns to
/// `Loaded` with the inline error set). `Failed` is recoverable by
/// another `search`.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchPhase {
    Idle,
    Loading,
    Loaded,
    LoadingMore,
    Failed(String),
}

/// Public snapshot of the accumulated list. Invariant after any
/// successful fetch-and-append: `items.len() == offset`.
#[derive(Debug, Clone)]
pub struct PaginationState {
    pub items: Vec<Monument>,
    pub offset: usize,
    pub limit: usize,
    pub total: usize,
    pub has_more: bool,
    pub loading_more: bool,
    pub load_more_error: Option<String>,
}

#[derive(Debug)]
struct FetcherInner {
    criteria: FilterCriteria,
    phase: FetchPhase,
    items: Vec<Monument>,
    offset: usize,
    total: usize,
    has_more: bool,
    load_more_error: Option<String>,
}

impl FetcherInner {
    fn new() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            phase: FetchPhase::Idle,
            items: Vec::new(),
            offset: 0,
            total: 0,
            has_more: false,
            load_more_error: None,
        }
    }
}

/// Paginated fetch-and-append over one search route. Each UI surface
/// receives its own instance as an injected handle; there is no
/// ambient shared singleton. A monotonic request token supersedes
/// in-flight responses when a newer `search` starts, and the phase
/// check makes concurrent `load_more` calls no-ops instead of racing
/// into duplicate appends.
pub struct PaginatedFilterFetcher {
    client: Arc<dyn HttpClient>,
    reference: Arc<ReferenceDataCache>,
    route: SearchRoute,
    limit: usize,
    inner: Mutex<FetcherInner>,
    seq: AtomicU64,
}

impl PaginatedFilterFetcher {
    pub fn new(
        client: Arc<dyn HttpClient>,
        reference: Arc<ReferenceDataCache>,
        route: SearchRoute,
    ) -> Self {
        Self {
            client,
            reference,
            route,
            limit: DEFAULT_PAGE_SIZE,
            inner: Mutex::new(FetcherInner::new()),
            seq: AtomicU64::new(0),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Runs a fresh search for `criteria`: page 0 is fetched and the
    /// accumulated list is replaced, regardless of what was loaded
    /// before. Failures land in the phase, not in a return value; a
    /// local validation failure short-circuits without a network call.
    pub async fn search(&self, criteria: FilterCriteria) {
        if let Err(e) = criteria.validate() {
            let mut inner = self.inner.lock();
            inner.phase = FetchPhase::Failed(e.to_string());
            return;
        }

        // Starting a new search invalidates whatever is in flight;
        // superseded responses are discarded below on token mismatch.
        let token = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut inner = self.inner.lock();
            inner.criteria = criteria.clone();
            inner.phase = FetchPhase::Loading;
            inner.load_more_error = None;
        }

        let result = self.fetch_page(&criteria, 0).await;

        let mut inner = self.inner.lock();
        if self.seq.load(Ordering::SeqCst) != token {
            tracing::debug!("discarding superseded search response");
            return;
        }
        match result {
            Ok(page) => {
                inner.offset = page.monuments.len();
                inner.items = page.monuments;
                inner.total = page.total;
                inner.has_more = page.has_more;
                inner.phase = FetchPhase::Loaded;
            }
            Err(e) => {
                tracing::warn!(error = %e, "initial search failed");
                inner.phase = FetchPhase::Failed(e.to_string());
            }
        }
    }

    /// Fetches the next page with the unchanged criteria, starting at
    /// the current offset, and appends. Ignored unless the fetcher is
    /// `Loaded` with `has_more`; in particular a second call while one
    /// is in flight is a no-op. A failed append keeps the loaded items
    /// and sets `load_more_error` instead of touching the phase error.
    pub async fn load_more(&self) {
        let (criteria, offset, token) = {
            let mut inner = self.inner.lock();
            if inner.phase != FetchPhase::Loaded || !inner.has_more {
                return;
            }
            inner.phase = FetchPhase::LoadingMore;
            inner.load_more_error = None;
            (
                inner.criteria.clone(),
                inner.offset,
                self.seq.load(Ordering::SeqCst),
            )
        };

        let result = self.fetch_page(&criteria, offset).await;

        let mut inner = self.inner.lock();
        if self.seq.load(Ordering::SeqCst) != token {
            // A newer search owns the state; it already reset the phase.
            tracing::debug!("discarding superseded load_more response");
            return;
        }
        match result {
            Ok(page) => {
                let appended = page.monuments.len();
                inner.items.extend(page.monuments);
                inner.offset += appended;
                inner.total = page.total;
                inner.has_more = page.has_more;
                inner.phase = FetchPhase::Loaded;
            }
            Err(e) => {
                tracing::warn!(error = %e, "load_more failed, keeping loaded items");
                inner.load_more_error = Some(e.to_string());
                inner.phase = FetchPhase::Loaded;
            }
        }
    }

    async fn fetch_page(
        &self,
        criteria: &FilterCriteria,
        offset: usize,
    ) -> Result<SearchPage, ApiError> {
        let mut params = self.route.filter_params(criteria);
        params.push(("limit".to_string(), self.limit.to_string()));
        params.push(("offset".to_string(), offset.to_string()));

        let payload = self.client.get(&self.route.path(), &params).await?;
        serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn phase(&self) -> FetchPhase {
        self.inner.lock().phase.clone()
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.inner.lock().criteria.clone()
    }

    pub fn state(&self) -> PaginationState {
        let inner = self.inner.lock();
        PaginationState {
            items: inner.items.clone(),
            offset: inner.offset,
            limit: self.limit,
            total: inner.total,
            has_more: inner.has_more,
            loading_more: inner.phase == FetchPhase::LoadingMore,
            load_more_error: inner.load_more_error.clone(),
        }
    }

    /// City options for the filter bar, served from the shared
    /// reference cache (a fresh cache entry costs no network call).
    pub async fn city_options(&self) -> Vec<ReferenceItem> {
        self.reference.fetch(ReferenceKind::Cities).await;
        self.reference.get_cached(ReferenceKind::Cities)
    }

    /// Theme options for the filter bar.
    pub async fn theme_options(&self) -> Vec<ReferenceItem> {
        self.reference.fetch(ReferenceKind::Themes).await;
        self.reference.get_cached(ReferenceKind::Themes)
    }
}
