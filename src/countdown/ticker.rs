//! Background countdown ticker
//!
//! Runs the countdown once per second on a tokio task and sends each result
//! to the application over a channel. Snapshots arrive over a `watch`
//! channel; the periodic timer only exists while a snapshot is present.

use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};
use std::fmt;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use super::{Countdown, CountdownResult};
use crate::data::PrayerTimings;

/// Interval between countdown recomputations
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Capacity of the update channel; a full channel drops the newest tick
const UPDATE_CHANNEL_CAPACITY: usize = 32;

/// Messages sent from the ticker to the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownUpdate {
    /// A freshly computed countdown
    Tick(CountdownResult),
    /// The snapshot was removed and the timer stopped
    Cleared,
    /// The countdown could not be computed from the current snapshot
    Failed(String),
}

/// Source of the current wall-clock time
pub trait Clock: Send + 'static {
    type Tz: TimeZone;

    fn now(&mut self) -> DateTime<Self::Tz>;

    /// Re-reads the wall clock, called whenever a new snapshot arrives
    fn resync(&mut self) {}
}

/// Largest gap between the monotonic reading and the wall clock that is
/// smoothed over instead of followed
pub const MAX_CLOCK_DRIFT: Duration = Duration::from_secs(5);

type WallSource<Tz> = Box<dyn Fn() -> DateTime<Tz> + Send>;

/// Wall clock advanced by a monotonic timer
///
/// Readings add the monotonic time elapsed since an anchor wall time, so
/// small adjustments to the system clock do not move the countdown. With a
/// wall source the anchor is refreshed on `resync` and whenever the two
/// disagree by more than `MAX_CLOCK_DRIFT`, which covers system suspend
/// (the monotonic timer stops while asleep) and manual clock changes.
pub struct MonotonicClock<Tz: TimeZone> {
    wall: DateTime<Tz>,
    anchor: Instant,
    source: Option<WallSource<Tz>>,
}

impl MonotonicClock<Local> {
    /// Clock following the local system time
    pub fn new() -> Self {
        Self::with_source(Local::now)
    }
}

impl Default for MonotonicClock<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> MonotonicClock<Tz> {
    /// Anchors a clock at a fixed wall time that is never re-read
    pub fn anchored_at(wall: DateTime<Tz>) -> Self {
        Self {
            wall,
            anchor: Instant::now(),
            source: None,
        }
    }

    /// Anchors a clock at `source()` and re-reads it to correct drift
    pub fn with_source<F>(source: F) -> Self
    where
        F: Fn() -> DateTime<Tz> + Send + 'static,
    {
        Self {
            wall: source(),
            anchor: Instant::now(),
            source: Some(Box::new(source)),
        }
    }

    fn monotonic_reading(&self) -> DateTime<Tz> {
        let elapsed = ChronoDuration::from_std(self.anchor.elapsed())
            .unwrap_or_else(|_| ChronoDuration::zero());
        self.wall.clone() + elapsed
    }

    fn reanchor(&mut self, wall: DateTime<Tz>) {
        self.wall = wall;
        self.anchor = Instant::now();
    }
}

impl<Tz: TimeZone> fmt::Debug for MonotonicClock<Tz> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonotonicClock")
            .field("wall", &self.wall.naive_local())
            .field("anchor", &self.anchor)
            .field("follows_wall", &self.source.is_some())
            .finish()
    }
}

impl<Tz> Clock for MonotonicClock<Tz>
where
    Tz: TimeZone + Send + 'static,
    Tz::Offset: Send,
{
    type Tz = Tz;

    fn now(&mut self) -> DateTime<Tz> {
        let reading = self.monotonic_reading();
        let Some(source) = &self.source else {
            return reading;
        };

        let wall = source();
        let drift = (wall.clone() - reading.clone()).abs();
        if drift.to_std().map_or(true, |drift| drift > MAX_CLOCK_DRIFT) {
            tracing::info!(
                drift_secs = drift.num_seconds(),
                "wall clock moved, re-anchoring countdown"
            );
            self.reanchor(wall.clone());
            return wall;
        }
        reading
    }

    fn resync(&mut self) {
        if let Some(source) = &self.source {
            let wall = source();
            self.reanchor(wall);
        }
    }
}

/// Handle for receiving countdown updates and stopping the ticker
pub struct CountdownHandle {
    /// Channel for receiving countdown updates
    pub receiver: mpsc::Receiver<CountdownUpdate>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl CountdownHandle {
    /// Spawns the ticker task
    ///
    /// # Arguments
    /// * `snapshots` - Current timings snapshot; `None` stops the timer
    /// * `clock` - Source of the time used for each computation
    ///
    /// # Returns
    /// A CountdownHandle that receives updates via the `receiver` channel
    pub fn spawn<C: Clock>(snapshots: watch::Receiver<Option<PrayerTimings>>, clock: C) -> Self {
        let (update_tx, update_rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run_ticker(snapshots, clock, update_tx, shutdown_rx));

        Self {
            receiver: update_rx,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Stops the ticker and waits for its task to finish
    ///
    /// Once this returns no further update is sent. Updates sent before the
    /// shutdown remain readable from `receiver`.
    pub async fn cancel(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Whether the ticker task is still running
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Checks for a pending countdown update without blocking
pub fn try_recv(handle: &mut CountdownHandle) -> Option<CountdownUpdate> {
    handle.receiver.try_recv().ok()
}

fn new_interval() -> Interval {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Waits for the next tick, or forever when there is no timer
async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn run_ticker<C: Clock>(
    mut snapshots: watch::Receiver<Option<PrayerTimings>>,
    mut clock: C,
    updates: mpsc::Sender<CountdownUpdate>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut countdown = Countdown::new();
    countdown.set_timings(*snapshots.borrow_and_update());
    let mut timer = countdown.is_counting().then(new_interval);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown_rx => {
                tracing::debug!("countdown ticker cancelled");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    tracing::debug!("snapshot sender dropped, stopping countdown ticker");
                    break;
                }

                let was_counting = countdown.is_counting();
                countdown.set_timings(*snapshots.borrow_and_update());

                if countdown.is_counting() {
                    // Restart so the new snapshot is shown immediately
                    clock.resync();
                    timer = Some(new_interval());
                    tracing::debug!("countdown started");
                } else {
                    timer = None;
                    if was_counting {
                        tracing::debug!("countdown cleared");
                        if !send(&updates, CountdownUpdate::Cleared) {
                            break;
                        }
                    }
                }
            }
            _ = next_tick(&mut timer) => {
                let update = match countdown.tick(&clock.now()) {
                    Ok(Some(result)) => CountdownUpdate::Tick(result),
                    Ok(None) => continue,
                    Err(err) => {
                        tracing::warn!(error = %err, "countdown computation failed");
                        CountdownUpdate::Failed(err.to_string())
                    }
                };
                if !send(&updates, update) {
                    break;
                }
            }
        }
    }
}

/// Sends without waiting; returns `false` once the receiver is gone
fn send(updates: &mpsc::Sender<CountdownUpdate>, update: CountdownUpdate) -> bool {
    match updates.try_send(update) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => true,
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}
