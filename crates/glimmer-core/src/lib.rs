//! Shared plumbing for glimmer prompt segments: configuration, errors,
//! the cache/HTTP/environment seams and the cached fetcher.

pub mod cache;
pub mod config;
pub mod env;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod segment;
pub mod ttl;

pub use cache::{CacheEntry, CacheStore, FileCache, MemoryCache};
pub use config::{Config, GitLabConfig, UnitSystem, ValidationResult, WeatherConfig};
pub use env::{Environment, StaticEnvironment, SystemEnvironment};
pub use error::{ConfigError, FetchError, SegmentError};
pub use fetcher::{CacheKeys, CachedFetcher, Fetched, Fresh};
pub use http::{HttpClient, HttpRequest, ReqwestHttpClient};
pub use segment::{DisplayFields, Outcome, Rendered, Segment, ERROR_SENTINEL};
pub use ttl::Ttl;

/// Initialize logging.
///
/// Diagnostics go to stderr so stdout stays reserved for segment output.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}
