//! Interval-based progress logging.

use log::info;

use fqdemux_metrics::format_count;

/// Default number of templates between progress messages.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000_000;

/// Logs a progress line each time a running count crosses a multiple of the interval.
///
/// The demultiplexing loop is single-threaded, so the tracker takes `&mut self` and keeps a plain
/// counter.
///
/// ```
/// use fqdemux_lib::progress::ProgressTracker;
///
/// let mut tracker = ProgressTracker::new("Demultiplexed templates").with_interval(100);
/// for _ in 0..250 {
///     tracker.log_if_needed(1); // logs at 100 and 200
/// }
/// tracker.log_final(); // logs "Demultiplexed templates 250 (complete)"
/// assert_eq!(tracker.count(), 250);
/// ```
pub struct ProgressTracker {
    interval: u64,
    message: String,
    count: u64,
}

impl ProgressTracker {
    /// Creates a tracker that logs with `message` every [`DEFAULT_PROGRESS_INTERVAL`] items.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { interval: DEFAULT_PROGRESS_INTERVAL, message: message.into(), count: 0 }
    }

    /// Sets the logging interval. Zero is treated as one.
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Adds `additional` to the count, logging once per interval boundary crossed.
    ///
    /// Returns `true` if the count now sits exactly on an interval boundary.
    pub fn log_if_needed(&mut self, additional: u64) -> bool {
        let prev = self.count;
        self.count += additional;
        for i in (prev / self.interval + 1)..=(self.count / self.interval) {
            info!("{} {}", self.message, format_count(i * self.interval));
        }
        self.count > 0 && self.count.is_multiple_of(self.interval)
    }

    /// Logs the final count unless the last boundary message already reported it.
    pub fn log_final(&mut self) {
        if !self.log_if_needed(0) && self.count > 0 {
            info!("{} {} (complete)", self.message, format_count(self.count));
        }
    }

    /// Items counted so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }
}
