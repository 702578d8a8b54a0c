pub mod catalog_service;
pub use catalog_service::{CatalogService, MovieExtras, Trailer};

pub mod popularity_service;
pub use popularity_service::{PopularityService, RepresentativeMovie, TrackerError, TrendingSearch};

pub mod popularity_service_impl;
pub use popularity_service_impl::PopularityTracker;

pub mod search_service;
pub use search_service::{MovieSearchService, RecordingHandle, SearchResults};

pub mod session;
pub use session::{SessionDriver, SessionEvent, SessionState};
