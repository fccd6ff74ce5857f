//! Aladhan prayer-times API client
//!
//! Fetches the daily prayer timings for a location and memoizes them in a
//! `TimedCache` keyed by rounded coordinates and calendar day, so nearby
//! positions share one entry and entries go stale at day rollover.

use chrono::NaiveDate;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use super::{get_json, Coordinates, FetchError, PrayerDay};
use crate::cache::{TimedCache, DEFAULT_CACHE_TTL};

/// Base URL for the Aladhan API
const ALADHAN_BASE_URL: &str = "https://api.aladhan.com/v1";

/// Calculation method used when none is configured (Umm al-Qura, Makkah)
pub const DEFAULT_METHOD: u8 = 4;

/// Decimal places coordinates are rounded to when building cache keys
///
/// Two places is roughly 1 km, well below the distance at which prayer
/// times differ by a minute.
pub const COORDINATE_PRECISION: usize = 2;

/// Builds the cache key for one location on one day
pub fn prayer_cache_key(coords: Coordinates, date: NaiveDate) -> String {
    format!(
        "prayer-{:.prec$}-{:.prec$}-{}",
        key_component(coords.latitude),
        key_component(coords.longitude),
        date.format("%Y-%m-%d"),
        prec = COORDINATE_PRECISION
    )
}

/// Rounds to the key precision, folding `-0.0` into `0.0`
fn key_component(value: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_PRECISION as i32);
    (value * scale).round() / scale + 0.0
}

/// Client for fetching daily prayer timings from the Aladhan API
#[derive(Debug, Clone)]
pub struct PrayerClient {
    client: Client,
    base_url: String,
    method: u8,
    cache: Arc<TimedCache<PrayerDay, FetchError>>,
}

impl Default for PrayerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PrayerClient {
    /// Create a new PrayerClient with default settings
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: ALADHAN_BASE_URL.to_string(),
            method: DEFAULT_METHOD,
            cache: Arc::new(TimedCache::new(DEFAULT_CACHE_TTL)),
        }
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a different calculation method
    pub fn with_method(mut self, method: u8) -> Self {
        self.method = method;
        self
    }

    /// Replace the cache with an empty one using the given validity window
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = Arc::new(TimedCache::new(ttl));
        self
    }

    /// The cache backing `get_times`
    pub fn cache(&self) -> &TimedCache<PrayerDay, FetchError> {
        &self.cache
    }

    /// Builds the timings request URL for a location and date
    pub fn timings_url(&self, coords: Coordinates, date: NaiveDate) -> String {
        format!(
            "{}/timings/{}?latitude={}&longitude={}&method={}",
            self.base_url.trim_end_matches('/'),
            date.format("%d-%m-%Y"),
            coords.latitude,
            coords.longitude,
            self.method
        )
    }

    /// Fetch the timings for a location and date, bypassing the cache
    ///
    /// # Returns
    /// * `Ok(PrayerDay)` - Raw timings and calendar info for the day
    /// * `Err(FetchError)` - If the request fails or the response is malformed
    pub async fn fetch_day(
        &self,
        coords: Coordinates,
        date: NaiveDate,
    ) -> Result<PrayerDay, FetchError> {
        let url = self.timings_url(coords, date);
        get_json(&self.client, &url).await
    }

    /// Fetch the timings for a location and date through the cache
    ///
    /// Repeated calls within the validity window for coordinates that round
    /// to the same key return the stored payload without a request.
    pub async fn get_times(
        &self,
        coords: Coordinates,
        date: NaiveDate,
    ) -> Result<PrayerDay, FetchError> {
        let key = prayer_cache_key(coords, date);
        let this = self.clone();

        let result = self
            .cache
            .get_or_fetch(&key, move || async move { this.fetch_day(coords, date).await })
            .await;

        if let Err(ref err) = result {
            tracing::warn!(%key, error = %err, "prayer timings fetch failed");
        }
        result
    }
}
