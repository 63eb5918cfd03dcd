// Core search/filter/booking-calculation layer of the travel-booking
// frontend: reference-data caching, query normalization, paginated
// filtered search and booking price computation. Rendering, routing
// and the booking-creation endpoints live above this crate.

pub mod client;
pub mod fetcher;
pub mod history;
pub mod normalizer;
pub mod pricing;
pub mod reference_cache;

// Re-export key types for convenience
pub use client::{ApiEnvelope, ApiError, HttpClient, RestClientConfig, RestHttpClient};
pub use fetcher::{
    FetchPhase, FilterCriteria, Monument, PaginatedFilterFetcher, PaginationState, SearchPage,
    SearchRoute, DEFAULT_PAGE_SIZE,
};
pub use history::{SearchHistory, SearchHistoryItem, HISTORY_CAP};
pub use normalizer::{canonical_fields, normalize, CanonicalField, SearchDomain};
pub use pricing::{
    compute_totals, nights_between, BookingLineItem, BookingSelection, BookingTotals,
    SelectedLine, DEFAULT_TAX_RATE_PERCENT, MAX_LINE_COUNT,
};
pub use reference_cache::{
    CacheConfig, CacheStatsReport, EntrySnapshot, ReferenceDataCache, ReferenceItem,
    ReferenceKind, CACHE_DURATION_MS,
};
