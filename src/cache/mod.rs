//! In-memory cache for API responses
//!
//! This module provides a time-keyed cache that memoizes the result of an
//! asynchronous fetch for a fixed validity window. Concurrent requests for the
//! same key share one pending fetch, and failed fetches are never stored.

mod timed;

pub use timed::{TimedCache, DEFAULT_CACHE_TTL};
