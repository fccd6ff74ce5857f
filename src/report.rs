//! Plain-text output for the non-interactive modes
//!
//! Each mode fetches what it needs and renders it as a `String`, which the
//! binary prints to stdout.

use chrono::{DateTime, TimeZone};
use std::fmt::Write;
use thiserror::Error;

use crate::cli::{AyahRef, Mode};
use crate::config::AppConfig;
use crate::countdown::{next_prayer, CountdownError, CountdownResult};
use crate::data::{
    adhkar, DhikrCategory, FetchError, PrayerClient, PrayerDay, PrayerTimings, QuranClient, Surah,
    SurahDetails, TimingsError,
};

/// Errors that can occur while producing a report
#[derive(Debug, Error)]
pub enum ReportError {
    /// Prayer times were requested without a location
    #[error("No location configured. Pass --lat and --lng or set \"location\" in the config file")]
    NoLocation,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Timings(#[from] TimingsError),

    #[error(transparent)]
    Countdown(#[from] CountdownError),

    /// The interactive mode has no text report
    #[error("The dashboard has no text report")]
    Interactive,
}

/// Runs a non-interactive mode and returns its output
pub async fn run<Tz: TimeZone>(
    mode: Mode,
    config: &AppConfig,
    now: DateTime<Tz>,
) -> Result<String, ReportError> {
    match mode {
        Mode::Dashboard => Err(ReportError::Interactive),
        Mode::Once => {
            let coords = config.location.ok_or(ReportError::NoLocation)?;
            let day = prayer_client(config)
                .get_times(coords, now.date_naive())
                .await?;
            let timings = day.prayer_timings()?;
            let countdown = next_prayer(&timings, &now)?;
            Ok(format_prayer_times(&day, &timings, &countdown))
        }
        Mode::Surahs => {
            let surahs = quran_client(config).get_all_surahs().await?;
            Ok(format_surah_index(&surahs))
        }
        Mode::Surah(number) => {
            let surahs = quran_client(config);
            let details = surahs.get_surah_details(number).await?;
            Ok(format_surah_text(number, &details))
        }
        Mode::Tafsir(reference) => {
            let text = quran_client(config)
                .get_tafsir(reference.surah, reference.ayah)
                .await?;
            Ok(format_tafsir(reference, &text))
        }
        Mode::Adhkar(category) => Ok(format_adhkar(category)),
    }
}

fn prayer_client(config: &AppConfig) -> PrayerClient {
    let client = PrayerClient::new()
        .with_method(config.method)
        .with_cache_ttl(config.cache_ttl());
    match &config.prayer_api_url {
        Some(url) => client.with_base_url(url.clone()),
        None => client,
    }
}

fn quran_client(config: &AppConfig) -> QuranClient {
    match &config.quran_api_url {
        Some(url) => QuranClient::new().with_base_url(url.clone()),
        None => QuranClient::new(),
    }
}

/// Today's prayers with the next one marked and the time remaining
pub fn format_prayer_times(
    day: &PrayerDay,
    timings: &PrayerTimings,
    countdown: &CountdownResult,
) -> String {
    let mut out = String::new();
    let hijri = &day.date.hijri;

    let _ = writeln!(
        out,
        "{}  ({} {} {})",
        day.date.readable, hijri.weekday.en, hijri.month.en, hijri.year
    );
    let _ = writeln!(out);

    for (prayer, time) in timings.iter() {
        let marker = if prayer == countdown.next { ">" } else { " " };
        let _ = writeln!(
            out,
            "{} {:<8} {:<7} {}",
            marker,
            prayer.key(),
            prayer.arabic_name(),
            time.format("%H:%M")
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Next: {} in {}", countdown.next, countdown.remaining);
    out
}

/// One line per surah: number, English name, Arabic name, ayah count
pub fn format_surah_index(surahs: &[Surah]) -> String {
    let mut out = String::new();
    for surah in surahs {
        let _ = writeln!(
            out,
            "{:>3}  {:<18} {}  ({} ayahs, {})",
            surah.number,
            surah.english_name,
            surah.name,
            surah.number_of_ayahs,
            surah.revelation_type
        );
    }
    out
}

/// The surah's ayahs, each prefixed by its number within the surah
pub fn format_surah_text(number: u16, details: &SurahDetails) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Surah {}", number);
    for ayah in &details.ayahs {
        let _ = writeln!(out, "{:>3}. {}", ayah.number_in_surah, ayah.text);
    }
    out
}

pub fn format_tafsir(reference: AyahRef, text: &str) -> String {
    format!("Tafsir {}:{}\n{}\n", reference.surah, reference.ayah, text.trim())
}

/// Remembrances grouped under a heading per category
pub fn format_adhkar(category: Option<DhikrCategory>) -> String {
    let mut out = String::new();
    for &heading in DhikrCategory::all() {
        if category.is_some_and(|c| c != heading) {
            continue;
        }
        let mut entries = adhkar::by_category(Some(heading)).peekable();
        if entries.peek().is_none() {
            continue;
        }
        if !out.is_empty() {
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "{}  {}", heading.label(), heading.arabic_label());
        for dhikr in entries {
            let _ = writeln!(out, "  {}  \u{d7}{}", dhikr.text, dhikr.count);
            if let Some(reference) = dhikr.reference {
                let _ = writeln!(out, "    {}", reference);
            }
            if let Some(benefit) = dhikr.benefit {
                let _ = writeln!(out, "    {}", benefit);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::Remaining;
    use crate::data::{Ayah, DayDate, HijriDate, LocalizedName, Prayer};
    use chrono::{NaiveDate, NaiveTime, Utc};
    use std::collections::BTreeMap;

    fn sample_day() -> PrayerDay {
        let timings: BTreeMap<String, String> = [
            ("Fajr", "05:00"),
            ("Dhuhr", "12:00"),
            ("Asr", "15:30"),
            ("Maghrib", "18:10"),
            ("Isha", "19:40"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        PrayerDay {
            timings,
            date: DayDate {
                readable: "14 Oct 2026".to_string(),
                hijri: HijriDate {
                    date: "02-05-1448".to_string(),
                    month: LocalizedName {
                        en: "Jumādá al-ūlá".to_string(),
                        ar: "جُمادى الأولى".to_string(),
                    },
                    weekday: LocalizedName {
                        en: "Al Arba'a".to_string(),
                        ar: "الاربعاء".to_string(),
                    },
                    year: "1448".to_string(),
                },
            },
        }
    }

    #[test]
    fn test_format_prayer_times_marks_next_prayer() {
        let day = sample_day();
        let timings = day.prayer_timings().unwrap();
        let countdown = CountdownResult {
            next: Prayer::Asr,
            at: NaiveDate::from_ymd_opt(2026, 10, 14)
                .unwrap()
                .and_time(NaiveTime::from_hms_opt(15, 30, 0).unwrap()),
            remaining: Remaining {
                hours: 2,
                minutes: 30,
                seconds: 0,
            },
        };

        let out = format_prayer_times(&day, &timings, &countdown);

        assert!(out.starts_with("14 Oct 2026"));
        assert!(out.contains("> Asr"), "Asr should be marked: {}", out);
        assert!(out.contains("  Dhuhr"), "Dhuhr should not be marked");
        assert!(out.contains("Next: Asr in 02:30:00"));
    }

    #[test]
    fn test_format_surah_index() {
        let surahs = vec![Surah {
            number: 1,
            name: "سُورَةُ ٱلْفَاتِحَةِ".to_string(),
            english_name: "Al-Faatiha".to_string(),
            english_name_translation: "The Opening".to_string(),
            number_of_ayahs: 7,
            revelation_type: "Meccan".to_string(),
        }];

        let out = format_surah_index(&surahs);
        assert!(out.contains("  1  Al-Faatiha"));
        assert!(out.contains("(7 ayahs, Meccan)"));
    }

    #[test]
    fn test_format_surah_text_numbers_ayahs() {
        let details = SurahDetails {
            ayahs: vec![Ayah {
                number: 6222,
                text: "قُلۡ هُوَ ٱللَّهُ أَحَدٌ".to_string(),
                number_in_surah: 1,
                juz: 30,
                page: 604,
                audio: None,
                audio_secondary: Vec::new(),
            }],
        };

        let out = format_surah_text(112, &details);
        assert!(out.starts_with("Surah 112\n"));
        assert!(out.contains("  1. قُلۡ"));
    }

    #[test]
    fn test_format_tafsir_trims_text() {
        let out = format_tafsir(AyahRef { surah: 2, ayah: 255 }, "  text  \n");
        assert_eq!(out, "Tafsir 2:255\ntext\n");
    }

    #[test]
    fn test_format_adhkar_filters_by_category() {
        let out = format_adhkar(Some(DhikrCategory::Morning));
        assert!(out.starts_with("Morning  أذكار الصباح\n"));
        assert!(out.contains("\u{d7}100"), "Should show the repetition count: {}", out);
        assert!(out.contains("رواه مسلم"));
        assert!(!out.contains("Evening"));
        assert!(!out.contains("After prayer"));
    }

    #[test]
    fn test_format_adhkar_lists_every_category() {
        let out = format_adhkar(None);
        for category in DhikrCategory::all() {
            assert!(out.contains(category.label()), "Missing {}: {}", category, out);
        }
        assert!(out.contains("\u{d7}33"));
    }

    #[tokio::test]
    async fn test_adhkar_needs_no_location_or_network() {
        let mode = Mode::Adhkar(Some(DhikrCategory::Evening));
        let out = run(mode, &AppConfig::default(), Utc::now()).await.unwrap();
        assert!(out.starts_with("Evening"));
    }

    #[tokio::test]
    async fn test_once_without_location_is_an_error() {
        let result = run(Mode::Once, &AppConfig::default(), Utc::now()).await;
        assert!(matches!(result, Err(ReportError::NoLocation)));
    }

    #[tokio::test]
    async fn test_dashboard_has_no_report() {
        let result = run(Mode::Dashboard, &AppConfig::default(), Utc::now()).await;
        assert!(matches!(result, Err(ReportError::Interactive)));
    }

    #[tokio::test]
    async fn test_once_surfaces_fetch_failure() {
        let config = AppConfig {
            location: crate::data::Coordinates::new(21.42, 39.83),
            prayer_api_url: Some("http://127.0.0.1:9/v1".to_string()),
            ..AppConfig::default()
        };

        let result = run(Mode::Once, &config, Utc::now()).await;
        assert!(matches!(result, Err(ReportError::Fetch(FetchError::Network(_)))));
    }
}
