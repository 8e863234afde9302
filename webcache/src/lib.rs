//! Request-level page cache.
//!
//! [`CachingFetcher`] wraps a [`PageFetcher`] with a per-URL request counter
//! and a time-bounded cache of the fetched body, both kept in a shared
//! [`KeyValueStore`].

pub mod caching_fetcher;
pub mod error;
pub mod events;
pub mod keys;
pub mod ports;

pub use caching_fetcher::CachingFetcher;
pub use error::FetchFailure;
pub use events::FetchEvent;
pub use keys::{count_key, result_key, DEFAULT_RESULT_TTL, MIN_RESULT_TTL};
pub use ports::{KeyValueStore, PageFetcher};
