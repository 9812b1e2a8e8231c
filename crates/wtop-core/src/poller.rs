//! Refresh scheduling and the poll cycle that feeds [`App`].

use crate::app::{App, CycleData};
use crate::provider::ClusterSource;
use crate::table::StatsTable;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const MIN_REFRESH_SECS: f64 = 0.5;
pub const MAX_REFRESH_SECS: f64 = 10.0;
pub const DEFAULT_REFRESH_SECS: f64 = 1.0;
pub const REFRESH_STEP_SECS: f64 = 0.5;
const BACKOFF_CEILING_SECS: f64 = 3.0;
const FAST_RETRY_SECS: f64 = 0.5;

/// User-chosen refresh rate plus the effective interval the poller adapts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshSchedule {
    rate: f64,
    interval: f64,
}

impl Default for RefreshSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_SECS)
    }
}

impl RefreshSchedule {
    /// Clamps `rate` into range and snaps it to the step grid.
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_finite() { rate } else { DEFAULT_REFRESH_SECS };
        let snapped = (rate / REFRESH_STEP_SECS).round() * REFRESH_STEP_SECS;
        let rate = snapped.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS);
        Self {
            rate,
            interval: rate,
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval)
    }

    pub fn slower(&mut self) {
        self.rate = (self.rate + REFRESH_STEP_SECS).min(MAX_REFRESH_SECS);
        self.interval = self.rate;
    }

    pub fn faster(&mut self) {
        self.rate = (self.rate - REFRESH_STEP_SECS).max(MIN_REFRESH_SECS);
        self.interval = self.rate;
    }

    /// Rows arrived: step back toward the user rate.
    pub fn on_data(&mut self) {
        self.interval = if self.interval > self.rate {
            (self.interval - REFRESH_STEP_SECS).max(self.rate)
        } else {
            self.rate
        };
    }

    /// The provider answered with nothing yet; retry quickly.
    pub fn on_empty(&mut self) {
        self.interval = self.rate.min(FAST_RETRY_SECS);
    }

    pub fn on_failure(&mut self) {
        let ceiling = BACKOFF_CEILING_SECS.max(self.rate);
        self.interval = (self.interval + REFRESH_STEP_SECS).min(ceiling);
    }
}

/// Tracks when the next poll is due. The first poll is due immediately.
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    next: Option<Instant>,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ticker {
    pub fn new() -> Self {
        Self { next: None }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next.map_or(true, |next| now >= next)
    }

    pub fn until_due(&self, now: Instant) -> Duration {
        self.next
            .map(|next| next.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    pub fn schedule(&mut self, now: Instant, interval: Duration) {
        self.next = Some(now + interval);
    }

    pub fn expedite(&mut self) {
        self.next = None;
    }
}

/// Runs one poll: both provider calls, then a single swap into `app`.
/// Provider failures are absorbed into the app's status line. Returns the
/// number of rows received.
pub fn run_cycle<S>(app: &mut App, source: &S) -> usize
where
    S: ClusterSource + ?Sized,
{
    let query = app.stats_query();
    debug!(scope = ?query.scope, columns = query.metrics.len(), "polling cluster");

    let status = source.status();
    if let Err(err) = &status {
        warn!(error = %err, "status provider failed");
    }
    let stats = source.stats(&query).map(|payload| StatsTable::parse(&payload));
    if let Err(err) = &stats {
        warn!(error = %err, "stats provider failed");
    }

    let rows = app.apply_cycle(CycleData { status, stats });
    debug!(rows, interval = app.schedule.interval_secs(), "poll applied");
    rows
}
