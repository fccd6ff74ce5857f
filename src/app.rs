//! Application state management for Noor Al-Huda
//!
//! This module contains the main application state: the configured location,
//! the loaded prayer day, the latest countdown, and keyboard handling. The
//! timings snapshot is published over a `watch` channel for the countdown
//! ticker.

use chrono::{DateTime, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::watch;

use crate::config::AppConfig;
use crate::countdown::{CountdownResult, CountdownUpdate, PLACEHOLDER};
use crate::data::{Coordinates, PrayerClient, PrayerDay, PrayerTimings};

/// Progress of loading today's prayer times
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrayerStatus {
    /// No location is configured
    NoLocation,
    /// A fetch is in progress
    Loading,
    /// Timings are loaded and the countdown is running
    Ready,
    /// The last fetch failed; holds a message for display
    Failed(String),
}

/// Main application struct managing state and data
pub struct App {
    /// Location used for prayer times
    pub location: Option<Coordinates>,
    /// Current load status
    pub status: PrayerStatus,
    /// Payload of the last successful load
    pub day: Option<PrayerDay>,
    /// Parsed timings from `day`
    pub timings: Option<PrayerTimings>,
    /// Latest countdown from the ticker
    pub countdown: Option<CountdownResult>,
    /// Date the current timings were requested for
    pub loaded_for: Option<NaiveDate>,
    /// Timestamp of last data refresh
    pub last_refresh: Option<DateTime<Local>>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag indicating a refresh has been requested
    pub refresh_requested: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Prayer times API client
    prayer_client: PrayerClient,
    /// Publishes the timings snapshot to the countdown ticker
    snapshots: watch::Sender<Option<PrayerTimings>>,
}

impl App {
    /// Creates a new App from the effective configuration
    pub fn new(config: &AppConfig) -> Self {
        let mut client = PrayerClient::new()
            .with_method(config.method)
            .with_cache_ttl(config.cache_ttl());
        if let Some(url) = &config.prayer_api_url {
            client = client.with_base_url(url.clone());
        }

        Self::with_client(config.location, client)
    }

    /// Creates a new App with a custom client
    pub fn with_client(location: Option<Coordinates>, prayer_client: PrayerClient) -> Self {
        let (snapshots, _) = watch::channel(None);
        Self {
            location,
            status: if location.is_some() {
                PrayerStatus::Loading
            } else {
                PrayerStatus::NoLocation
            },
            day: None,
            timings: None,
            countdown: None,
            loaded_for: None,
            last_refresh: None,
            should_quit: false,
            refresh_requested: false,
            show_help: false,
            prayer_client,
            snapshots,
        }
    }

    /// Returns a receiver for timings snapshots, for the countdown ticker
    pub fn subscribe(&self) -> watch::Receiver<Option<PrayerTimings>> {
        self.snapshots.subscribe()
    }

    /// Whether the timings should be (re)loaded for `today`
    ///
    /// True when a location is set and nothing has been requested for this
    /// date yet, which also covers the rollover past midnight.
    pub fn needs_reload(&self, today: NaiveDate) -> bool {
        self.location.is_some() && self.loaded_for != Some(today)
    }

    /// Changes the location; clearing it stops the countdown
    pub fn set_location(&mut self, location: Option<Coordinates>) {
        self.location = location;
        self.loaded_for = None;
        if location.is_none() {
            self.day = None;
            self.status = PrayerStatus::NoLocation;
            self.publish(None);
        }
    }

    /// Loads the prayer times for `today` and publishes the snapshot
    ///
    /// On any failure the snapshot is cleared so the countdown never runs on
    /// timings for another day or place.
    pub async fn load_prayer_times(&mut self, today: NaiveDate) {
        let Some(coords) = self.location else {
            self.status = PrayerStatus::NoLocation;
            self.publish(None);
            return;
        };

        self.status = PrayerStatus::Loading;
        self.refresh_requested = false;

        match self.prayer_client.get_times(coords, today).await {
            Ok(day) => match day.prayer_timings() {
                Ok(timings) => {
                    tracing::info!(date = %today, "prayer times loaded");
                    self.day = Some(day);
                    self.status = PrayerStatus::Ready;
                    self.publish(Some(timings));
                }
                Err(err) => {
                    tracing::error!(error = %err, "prayer times response is malformed");
                    self.day = None;
                    self.status = PrayerStatus::Failed(format!("Malformed prayer times: {}", err));
                    self.publish(None);
                }
            },
            Err(err) => {
                self.day = None;
                self.status = PrayerStatus::Failed(err.to_string());
                self.publish(None);
            }
        }

        self.loaded_for = Some(today);
        self.last_refresh = Some(Local::now());
    }

    fn publish(&mut self, timings: Option<PrayerTimings>) {
        self.timings = timings;
        if timings.is_none() {
            self.countdown = None;
        }
        self.snapshots.send_replace(timings);
    }

    /// Applies an update from the countdown ticker
    pub fn apply_update(&mut self, update: CountdownUpdate) {
        match update {
            CountdownUpdate::Tick(result) => {
                // A tick computed before the snapshot was cleared is stale
                if self.timings.is_some() {
                    self.countdown = Some(result);
                    self.status = PrayerStatus::Ready;
                }
            }
            CountdownUpdate::Cleared => {
                self.countdown = None;
            }
            CountdownUpdate::Failed(message) => {
                self.countdown = None;
                self.status = PrayerStatus::Failed(message);
            }
        }
    }

    /// Remaining time as `HH:MM:SS`, or a placeholder without a countdown
    pub fn countdown_text(&self) -> String {
        self.countdown
            .map(|c| c.remaining.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q` or `Esc`: Quit the application
    /// - `r`: Refresh prayer times
    /// - `?`: Toggle help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => {
                self.refresh_requested = true;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }
}
