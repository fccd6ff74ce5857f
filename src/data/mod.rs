//! Core data models for Noor Al-Huda
//!
//! This module contains the data types shared by the API clients and the
//! countdown: coordinates, the decoded prayer-times payload, the parsed
//! timings snapshot, and Quran content records. The built-in adhkar
//! collection lives in `adhkar`.

pub mod adhkar;
pub mod prayer;
pub mod quran;

pub use adhkar::{Dhikr, DhikrCategory, ADHKAR};
pub use prayer::{prayer_cache_key, PrayerClient, COORDINATE_PRECISION, DEFAULT_METHOD};
pub use quran::{QuranClient, SURAH_COUNT};

use chrono::NaiveTime;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur when fetching from an external content API
///
/// Variants carry owned strings rather than the source errors so the error
/// can be cloned and handed to every caller sharing one in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not be sent or the connection failed
    #[error("HTTP request failed: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// The server rejected the request for exceeding its rate limit
    #[error("Request quota exceeded")]
    Quota,

    /// The response body was not the expected JSON
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// The API envelope reported a failure
    #[error("API returned code {code}: {status}")]
    Api { code: u16, status: String },

    /// The request parameters were rejected before sending
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// Errors raised when a timings payload cannot be turned into a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimingsError {
    /// One of the five daily prayers is absent from the payload
    #[error("Missing time for {0}")]
    MissingPrayer(Prayer),

    /// A prayer's time is not in `HH:MM` form
    #[error("Invalid time for {prayer}: '{value}'")]
    InvalidTime { prayer: Prayer, value: String },
}

/// A geographic location in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude, -90 to 90
    pub latitude: f64,
    /// Longitude, -180 to 180
    pub longitude: f64,
}

impl Coordinates {
    /// Creates coordinates, returning `None` when either value is out of range
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let coords = Self {
            latitude,
            longitude,
        };
        coords.is_valid().then_some(coords)
    }

    /// Whether both values are finite and within range
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// The five canonical daily prayers, declared in daily order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    /// All prayers in the order they occur during a day
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    /// Key used for this prayer in the timings API payload
    pub fn key(self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    /// Arabic display name
    pub fn arabic_name(self) -> &'static str {
        match self {
            Prayer::Fajr => "الفجر",
            Prayer::Dhuhr => "الظهر",
            Prayer::Asr => "العصر",
            Prayer::Maghrib => "المغرب",
            Prayer::Isha => "العشاء",
        }
    }
}

impl std::fmt::Display for Prayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A name given in both English and Arabic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub en: String,
    pub ar: String,
}

/// Hijri calendar date as reported by the timings API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HijriDate {
    /// Date in `DD-MM-YYYY` form
    pub date: String,
    pub month: LocalizedName,
    pub weekday: LocalizedName,
    #[serde(default)]
    pub year: String,
}

/// Calendar information for the day the timings apply to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayDate {
    /// Gregorian date, e.g. "14 Oct 2026"
    pub readable: String,
    pub hijri: HijriDate,
}

/// Decoded prayer-times payload for one day at one location
///
/// This is the value the prayer cache stores. The timings are kept as the raw
/// strings the API returned; `PrayerTimings::from_raw` validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerDay {
    /// Every named time the API returned, including non-prayer entries like Sunrise
    pub timings: BTreeMap<String, String>,
    pub date: DayDate,
}

impl PrayerDay {
    /// Parses the five daily prayers out of the raw timings
    pub fn prayer_timings(&self) -> Result<PrayerTimings, TimingsError> {
        PrayerTimings::from_raw(&self.timings)
    }
}

/// Validated times of the five daily prayers for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrayerTimings {
    pub fajr: NaiveTime,
    pub dhuhr: NaiveTime,
    pub asr: NaiveTime,
    pub maghrib: NaiveTime,
    pub isha: NaiveTime,
}

impl PrayerTimings {
    /// Builds a snapshot from a `name -> time` map, failing on the first
    /// missing or malformed prayer
    ///
    /// Values may carry a trailing zone annotation such as `"05:12 (EET)"`;
    /// only the leading `HH:MM` token is read.
    pub fn from_raw(raw: &BTreeMap<String, String>) -> Result<Self, TimingsError> {
        let time_of = |prayer: Prayer| -> Result<NaiveTime, TimingsError> {
            let value = raw
                .get(prayer.key())
                .ok_or(TimingsError::MissingPrayer(prayer))?;
            parse_prayer_time(prayer, value)
        };

        Ok(Self {
            fajr: time_of(Prayer::Fajr)?,
            dhuhr: time_of(Prayer::Dhuhr)?,
            asr: time_of(Prayer::Asr)?,
            maghrib: time_of(Prayer::Maghrib)?,
            isha: time_of(Prayer::Isha)?,
        })
    }

    /// Time of day for the given prayer
    pub fn get(&self, prayer: Prayer) -> NaiveTime {
        match prayer {
            Prayer::Fajr => self.fajr,
            Prayer::Dhuhr => self.dhuhr,
            Prayer::Asr => self.asr,
            Prayer::Maghrib => self.maghrib,
            Prayer::Isha => self.isha,
        }
    }

    /// Iterates prayers with their times in daily order
    pub fn iter(&self) -> impl Iterator<Item = (Prayer, NaiveTime)> + '_ {
        Prayer::ALL.into_iter().map(move |prayer| (prayer, self.get(prayer)))
    }
}

/// Parse an API time string (e.g., "05:12" or "05:12 (EET)") to NaiveTime
fn parse_prayer_time(prayer: Prayer, value: &str) -> Result<NaiveTime, TimingsError> {
    let invalid = || TimingsError::InvalidTime {
        prayer,
        value: value.to_string(),
    };

    let time_part = value.split_whitespace().next().ok_or_else(invalid)?;
    NaiveTime::parse_from_str(time_part, "%H:%M").map_err(|_| invalid())
}

/// A surah (chapter) summary from the Quran API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surah {
    pub number: u16,
    /// Arabic name
    pub name: String,
    pub english_name: String,
    pub english_name_translation: String,
    pub number_of_ayahs: u16,
    /// "Meccan" or "Medinan"
    pub revelation_type: String,
}

/// A single ayah (verse) with its recitation audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ayah {
    /// Position across the whole Quran
    pub number: u32,
    pub text: String,
    pub number_in_surah: u16,
    pub juz: u8,
    pub page: u16,
    /// URL to the recitation audio
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub audio_secondary: Vec<String>,
}

/// Full text of a surah
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurahDetails {
    pub ayahs: Vec<Ayah>,
}

/// Standard `{ code, status, data }` wrapper used by both content APIs
///
/// `data` is held as a raw value so a failure envelope, whose `data` is an
/// error message, still decodes far enough to report its code.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    code: u16,
    status: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Decodes an API envelope and returns its `data` payload
pub(crate) fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    let envelope: ApiEnvelope = serde_json::from_str(body)?;

    if envelope.code != 200 {
        return Err(FetchError::Api {
            code: envelope.code,
            status: envelope.status,
        });
    }

    if envelope.data.is_null() {
        return Err(FetchError::Parse("response has no data".to_string()));
    }

    Ok(serde_json::from_value(envelope.data)?)
}

/// Sends a GET request and decodes the enveloped JSON response
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T, FetchError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::Quota);
    }
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let text = response.text().await?;
    decode_envelope(&text)
}
