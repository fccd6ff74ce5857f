//! alquran.cloud API client
//!
//! Fetches the surah index, surah text with recitation audio, and tafsir.
//! The surah index never changes between requests, so it is memoized.

use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use super::{get_json, FetchError, Surah, SurahDetails};
use crate::cache::{TimedCache, DEFAULT_CACHE_TTL};

/// Base URL for the alquran.cloud API
const ALQURAN_BASE_URL: &str = "https://api.alquran.cloud/v1";

/// Edition providing Arabic text with Mishary Alafasy's recitation
const RECITATION_EDITION: &str = "ar.alafasy";

/// Edition providing Tafsir al-Muyassar
const TAFSIR_EDITION: &str = "ar.muyassar";

/// Cache key for the surah index
const SURAHS_CACHE_KEY: &str = "surahs";

/// Number of surahs in the Quran
pub const SURAH_COUNT: u16 = 114;

#[derive(Debug, Deserialize)]
struct TafsirAyah {
    text: String,
}

/// Client for fetching Quran content
#[derive(Debug, Clone)]
pub struct QuranClient {
    client: Client,
    base_url: String,
    surahs: Arc<TimedCache<Vec<Surah>, FetchError>>,
}

impl Default for QuranClient {
    fn default() -> Self {
        Self::new()
    }
}

impl QuranClient {
    /// Create a new QuranClient with default settings
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: ALQURAN_BASE_URL.to_string(),
            surahs: Arc::new(TimedCache::new(DEFAULT_CACHE_TTL)),
        }
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Fetch the index of all surahs, memoized for the cache window
    pub async fn get_all_surahs(&self) -> Result<Vec<Surah>, FetchError> {
        let client = self.client.clone();
        let url = self.url("surah");

        self.surahs
            .get_or_fetch(SURAHS_CACHE_KEY, move || async move {
                get_json(&client, &url).await
            })
            .await
    }

    /// Fetch the Arabic text and recitation audio of one surah
    pub async fn get_surah_details(&self, number: u16) -> Result<SurahDetails, FetchError> {
        check_surah_number(number)?;
        let url = self.url(&format!("surah/{}/{}", number, RECITATION_EDITION));
        get_json(&self.client, &url).await
    }

    /// Fetch the tafsir for one ayah, addressed by its number within the surah
    pub async fn get_tafsir(&self, surah: u16, ayah_in_surah: u16) -> Result<String, FetchError> {
        check_surah_number(surah)?;
        if ayah_in_surah == 0 {
            return Err(FetchError::InvalidRequest(
                "ayah numbers start at 1".to_string(),
            ));
        }

        let url = self.url(&format!("ayah/{}:{}/{}", surah, ayah_in_surah, TAFSIR_EDITION));
        let ayah: TafsirAyah = get_json(&self.client, &url).await?;
        Ok(ayah.text)
    }
}

fn check_surah_number(number: u16) -> Result<(), FetchError> {
    if (1..=SURAH_COUNT).contains(&number) {
        Ok(())
    } else {
        Err(FetchError::InvalidRequest(format!(
            "surah number {} is outside 1-{}",
            number, SURAH_COUNT
        )))
    }
}
