//! Next-prayer countdown
//!
//! Given a day's prayer timings and the current instant, determines which
//! prayer comes next and how long remains until it. When every prayer of the
//! day has passed the countdown wraps to tomorrow's Fajr.

mod ticker;

pub use ticker::{try_recv, Clock, CountdownHandle, CountdownUpdate, MonotonicClock, TICK_INTERVAL};

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone};
use std::fmt;
use thiserror::Error;

use crate::data::{Prayer, PrayerTimings};

/// Placeholder shown while no timings are available
pub const PLACEHOLDER: &str = "--:--:--";

/// Longest DST gap searched when a prayer's local time does not exist
const MAX_GAP_MINUTES: i64 = 180;

/// Errors that can occur while computing the countdown
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountdownError {
    /// The prayer's wall-clock time has no corresponding instant in the zone
    #[error("No valid local time for {prayer} at {local}")]
    UnresolvableLocalTime {
        prayer: Prayer,
        local: NaiveDateTime,
    },

    /// Tomorrow's date is beyond the supported calendar range
    #[error("Date out of range")]
    DateOutOfRange,
}

/// Time left until a prayer, floored to whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub hours: u64,
    pub minutes: u8,
    pub seconds: u8,
}

impl Remaining {
    /// Decomposes a duration into hours, minutes and seconds
    ///
    /// Fractions of a second are dropped and negative durations clamp to zero.
    pub fn from_duration(duration: Duration) -> Self {
        let total = duration.num_seconds().max(0) as u64;
        Self {
            hours: total / 3600,
            minutes: ((total % 3600) / 60) as u8,
            seconds: (total % 60) as u8,
        }
    }

    /// Total whole seconds remaining
    pub fn total_seconds(&self) -> u64 {
        self.hours * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// The upcoming prayer and the time left until it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownResult {
    pub next: Prayer,
    /// Wall-clock date and time of the prayer in the caller's zone
    pub at: NaiveDateTime,
    pub remaining: Remaining,
}

/// Finds the first prayer strictly after `now`
///
/// Prayers are checked in daily order against today's date in `now`'s zone.
/// A prayer whose instant equals `now` counts as passed. If none are left
/// today, the result is Fajr on the following day.
pub fn next_prayer<Tz: TimeZone>(
    timings: &PrayerTimings,
    now: &DateTime<Tz>,
) -> Result<CountdownResult, CountdownError> {
    let tz = now.timezone();
    let today = now.date_naive();

    for (prayer, time) in timings.iter() {
        let instant = resolve_local(&tz, today.and_time(time), prayer)?;
        if instant > *now {
            return Ok(result_for(prayer, &instant, now));
        }
    }

    let tomorrow = today.succ_opt().ok_or(CountdownError::DateOutOfRange)?;
    let fajr = resolve_local(&tz, tomorrow.and_time(timings.fajr), Prayer::Fajr)?;
    Ok(result_for(Prayer::Fajr, &fajr, now))
}

fn result_for<Tz: TimeZone>(
    prayer: Prayer,
    instant: &DateTime<Tz>,
    now: &DateTime<Tz>,
) -> CountdownResult {
    CountdownResult {
        next: prayer,
        at: instant.naive_local(),
        remaining: Remaining::from_duration(instant.clone() - now.clone()),
    }
}

/// Maps a wall-clock time to an instant in `tz`
///
/// Ambiguous times (clocks turned back) take the earlier instant. Times that
/// fall inside a gap (clocks turned forward) move to the first valid minute
/// after it.
fn resolve_local<Tz: TimeZone>(
    tz: &Tz,
    local: NaiveDateTime,
    prayer: Prayer,
) -> Result<DateTime<Tz>, CountdownError> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(instant) => Ok(instant),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => (1..=MAX_GAP_MINUTES)
            .find_map(|minutes| {
                tz.from_local_datetime(&(local + Duration::minutes(minutes)))
                    .earliest()
            })
            .ok_or(CountdownError::UnresolvableLocalTime { prayer, local }),
    }
}

/// Whether the countdown has a timings snapshot to work from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    /// No snapshot yet, or it was cleared; the display shows a placeholder
    NoData,
    /// A snapshot is present and the countdown is recomputed every tick
    Counting(PrayerTimings),
}

/// Two-state countdown driven by snapshot arrival and removal
#[derive(Debug, Clone)]
pub struct Countdown {
    state: CountdownState,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    /// Creates a countdown in the `NoData` state
    pub fn new() -> Self {
        Self {
            state: CountdownState::NoData,
        }
    }

    pub fn state(&self) -> &CountdownState {
        &self.state
    }

    pub fn is_counting(&self) -> bool {
        matches!(self.state, CountdownState::Counting(_))
    }

    /// Installs a new snapshot, or clears it with `None`
    pub fn set_timings(&mut self, timings: Option<PrayerTimings>) {
        self.state = match timings {
            Some(timings) => CountdownState::Counting(timings),
            None => CountdownState::NoData,
        };
    }

    /// Computes the countdown at `now`, or `None` while there is no snapshot
    pub fn tick<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Result<Option<CountdownResult>, CountdownError> {
        match &self.state {
            CountdownState::NoData => Ok(None),
            CountdownState::Counting(timings) => next_prayer(timings, now).map(Some),
        }
    }
}

/// Replaces ASCII digits with Arabic-Indic digits
pub fn to_arabic_numerals(text: &str) -> String {
    const DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

    text.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => DIGITS[d as usize],
            None => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, NaiveTime, Utc};

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn sample_timings() -> PrayerTimings {
        PrayerTimings {
            fajr: hm(5, 0),
            dhuhr: hm(12, 0),
            asr: hm(15, 30),
            maghrib: hm(18, 10),
            isha: hm(19, 40),
        }
    }

    fn utc_at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2026, 3, 10)
                .unwrap()
                .and_hms_opt(h, m, s)
                .unwrap(),
        )
    }

    #[test]
    fn test_selects_first_future_prayer() {
        let result = next_prayer(&sample_timings(), &utc_at(13, 0, 0)).unwrap();

        assert_eq!(result.next, Prayer::Asr, "Dhuhr has passed, Asr is next");
        assert_eq!(result.remaining.to_string(), "02:30:00");
        assert_eq!(
            result.at,
            NaiveDate::from_ymd_opt(2026, 3, 10)
                .unwrap()
                .and_time(hm(15, 30))
        );
    }

    #[test]
    fn test_before_fajr_targets_todays_fajr() {
        let result = next_prayer(&sample_timings(), &utc_at(3, 15, 0)).unwrap();

        assert_eq!(result.next, Prayer::Fajr);
        assert_eq!(result.at.date(), NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        assert_eq!(result.remaining.to_string(), "01:45:00");
    }

    #[test]
    fn test_wraps_to_tomorrows_fajr_after_isha() {
        let result = next_prayer(&sample_timings(), &utc_at(23, 0, 0)).unwrap();

        assert_eq!(result.next, Prayer::Fajr);
        assert_eq!(
            result.at,
            NaiveDate::from_ymd_opt(2026, 3, 11)
                .unwrap()
                .and_time(hm(5, 0)),
            "Fajr should be on the following day"
        );
        assert_eq!(result.remaining.to_string(), "06:00:00");
    }

    #[test]
    fn test_exact_prayer_instant_counts_as_passed() {
        let result = next_prayer(&sample_timings(), &utc_at(15, 30, 0)).unwrap();

        assert_eq!(result.next, Prayer::Maghrib);
        assert_eq!(result.remaining.to_string(), "02:40:00");
    }

    #[test]
    fn test_exact_isha_instant_wraps_to_fajr() {
        let result = next_prayer(&sample_timings(), &utc_at(19, 40, 0)).unwrap();
        assert_eq!(result.next, Prayer::Fajr);
    }

    #[test]
    fn test_wrap_targets_fajr_even_when_unordered() {
        // Isha past midnight is earlier in the day than Fajr; once every time
        // of day has passed the wrap still picks Fajr
        let timings = PrayerTimings {
            isha: hm(0, 30),
            ..sample_timings()
        };
        let result = next_prayer(&timings, &utc_at(21, 0, 0)).unwrap();
        assert_eq!(result.next, Prayer::Fajr);
    }

    #[test]
    fn test_remaining_is_floored_not_rounded() {
        let now = utc_at(13, 0, 0) + Duration::milliseconds(999);
        let result = next_prayer(&sample_timings(), &now).unwrap();

        assert_eq!(result.remaining.to_string(), "02:29:59");
    }

    #[test]
    fn test_one_second_before_prayer() {
        let now = utc_at(12, 0, 0) - Duration::seconds(1);
        let result = next_prayer(&sample_timings(), &now).unwrap();

        assert_eq!(result.next, Prayer::Dhuhr);
        assert_eq!(result.remaining.total_seconds(), 1);
        assert_eq!(result.remaining.to_string(), "00:00:01");
    }

    #[test]
    fn test_uses_the_clock_zone_for_today() {
        // 23:30 UTC on the 10th is 02:30 on the 11th in UTC+3
        let riyadh = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = utc_at(23, 30, 0).with_timezone(&riyadh);

        let result = next_prayer(&sample_timings(), &now).unwrap();

        assert_eq!(result.next, Prayer::Fajr);
        assert_eq!(result.at.date(), NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
        assert_eq!(result.remaining.to_string(), "02:30:00");
    }

    #[test]
    fn test_remaining_display_zero_pads() {
        let remaining = Remaining::from_duration(Duration::seconds(3 * 3600 + 5 * 60 + 7));
        assert_eq!(remaining.to_string(), "03:05:07");
    }

    #[test]
    fn test_remaining_never_negative() {
        let remaining = Remaining::from_duration(Duration::seconds(-30));
        assert_eq!(remaining.total_seconds(), 0);
        assert_eq!(remaining.to_string(), "00:00:00");
    }

    #[test]
    fn test_countdown_state_transitions() {
        let mut countdown = Countdown::new();
        assert_eq!(countdown.state(), &CountdownState::NoData);
        assert_eq!(countdown.tick(&utc_at(13, 0, 0)), Ok(None));

        countdown.set_timings(Some(sample_timings()));
        assert!(countdown.is_counting());
        let result = countdown.tick(&utc_at(13, 0, 0)).unwrap().unwrap();
        assert_eq!(result.next, Prayer::Asr);

        countdown.set_timings(None);
        assert!(!countdown.is_counting());
        assert_eq!(countdown.tick(&utc_at(13, 0, 0)), Ok(None));
    }

    /// Zone at UTC-5 that moves `GAP_HOURS` forward on 2026-03-08 07:00 UTC
    /// and back again on 2026-11-01 06:00 UTC
    #[derive(Debug, Clone, Copy)]
    struct ShiftZone<const GAP_HOURS: i32>;

    impl<const GAP_HOURS: i32> ShiftZone<GAP_HOURS> {
        fn standard() -> FixedOffset {
            FixedOffset::west_opt(5 * 3600).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::west_opt((5 - GAP_HOURS) * 3600).unwrap()
        }

        fn offset_at(utc: &NaiveDateTime) -> FixedOffset {
            let spring = NaiveDate::from_ymd_opt(2026, 3, 8)
                .unwrap()
                .and_hms_opt(7, 0, 0)
                .unwrap();
            let fall = NaiveDate::from_ymd_opt(2026, 11, 1)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap();
            if *utc >= spring && *utc < fall {
                Self::summer()
            } else {
                Self::standard()
            }
        }

        fn at_utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Self> {
            ShiftZone.from_utc_datetime(
                &NaiveDate::from_ymd_opt(y, mo, d)
                    .unwrap()
                    .and_hms_opt(h, mi, 0)
                    .unwrap(),
            )
        }
    }

    impl<const GAP_HOURS: i32> TimeZone for ShiftZone<GAP_HOURS> {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            ShiftZone
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            // Summer first, since it maps a local time to the earlier instant
            let valid: Vec<FixedOffset> = [Self::summer(), Self::standard()]
                .into_iter()
                .filter(|offset| Self::offset_at(&(*local - *offset)) == *offset)
                .collect();

            match valid[..] {
                [] => LocalResult::None,
                [only] => LocalResult::Single(only),
                [earlier, later, ..] => LocalResult::Ambiguous(earlier, later),
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            Self::offset_at(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            Self::offset_at(utc)
        }
    }

    #[test]
    fn test_prayer_in_dst_gap_moves_to_end_of_gap() {
        // Clocks jump from 02:00 to 03:00 local; 01:00 local is 06:00 UTC
        let timings = PrayerTimings {
            fajr: hm(2, 30),
            ..sample_timings()
        };
        let now = ShiftZone::<1>::at_utc(2026, 3, 8, 6, 0);

        let result = next_prayer(&timings, &now).unwrap();

        assert_eq!(result.next, Prayer::Fajr);
        assert_eq!(
            result.at,
            NaiveDate::from_ymd_opt(2026, 3, 8)
                .unwrap()
                .and_time(hm(3, 0))
        );
        assert_eq!(result.remaining.to_string(), "01:00:00");
    }

    #[test]
    fn test_ambiguous_prayer_time_takes_earliest_instant() {
        // 01:00 to 02:00 local happens twice; midnight local is 04:00 UTC
        let timings = PrayerTimings {
            fajr: hm(1, 30),
            ..sample_timings()
        };
        let now = ShiftZone::<1>::at_utc(2026, 11, 1, 4, 0);

        let result = next_prayer(&timings, &now).unwrap();

        assert_eq!(result.next, Prayer::Fajr);
        assert_eq!(
            result.remaining.to_string(),
            "01:30:00",
            "The first 01:30 is an hour earlier than the second"
        );
    }

    #[test]
    fn test_gap_longer_than_search_window_is_an_error() {
        // A four hour jump from 02:00 to 06:00 local
        let timings = PrayerTimings {
            fajr: hm(2, 30),
            ..sample_timings()
        };
        let now = ShiftZone::<4>::at_utc(2026, 3, 8, 6, 0);

        let err = next_prayer(&timings, &now).unwrap_err();

        assert_eq!(
            err,
            CountdownError::UnresolvableLocalTime {
                prayer: Prayer::Fajr,
                local: NaiveDate::from_ymd_opt(2026, 3, 8)
                    .unwrap()
                    .and_time(hm(2, 30)),
            }
        );
    }

    #[test]
    fn test_to_arabic_numerals() {
        assert_eq!(to_arabic_numerals("02:30:00"), "٠٢:٣٠:٠٠");
        assert_eq!(to_arabic_numerals(PLACEHOLDER), PLACEHOLDER);
    }
}
