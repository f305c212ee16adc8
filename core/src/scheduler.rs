//! Throttled refresh scheduling
//!
//! Values are resampled at most once per interval. Between refreshes the
//! overlay shows the last cached values, so staleness is bounded by the
//! interval.

use crate::registry::TargetRegistry;

/// Default spacing between two resample passes
pub const DEFAULT_REFRESH_INTERVAL: f32 = 0.25;

/// Smallest interval ever used, whatever is configured
pub const MIN_REFRESH_INTERVAL: f32 = 0.01;

/// Drives prune and refresh on the host's tick
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    enabled: bool,
    interval: f32,
    /// Host time (seconds) before which no refresh happens
    next_refresh_at: f64,
    /// Completed refresh passes
    passes: u64,
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshScheduler {
    /// Create an enabled scheduler with the default interval
    pub fn new() -> Self {
        Self {
            enabled: true,
            interval: DEFAULT_REFRESH_INTERVAL,
            next_refresh_at: 0.0,
            passes: 0,
        }
    }

    /// Whether ticks do any work
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable refreshing
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Configured interval in seconds
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Set the interval; non-finite values are ignored
    pub fn set_interval(&mut self, seconds: f32) {
        if seconds.is_finite() {
            self.interval = seconds;
        }
    }

    /// Interval actually applied between passes
    pub fn effective_interval(&self) -> f32 {
        self.interval.max(MIN_REFRESH_INTERVAL)
    }

    /// Number of refresh passes run so far
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Make the next tick refresh regardless of the deadline
    pub fn rearm(&mut self) {
        self.next_refresh_at = 0.0;
    }

    /// Whether a tick at `now` would refresh
    pub fn is_due(&self, now: f64) -> bool {
        self.enabled && now >= self.next_refresh_at
    }

    /// Run one host tick
    ///
    /// Returns true if a refresh pass ran. Within a pass dead targets are
    /// always pruned before live ones are resampled.
    pub fn tick(&mut self, now: f64, registry: &mut TargetRegistry) -> bool {
        if !self.is_due(now) {
            return false;
        }

        self.next_refresh_at = now + f64::from(self.effective_interval());
        registry.prune_dead();
        registry.refresh_all();
        self.passes += 1;
        true
    }
}
