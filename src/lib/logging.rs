//! Formatting helpers and summaries for log output.

use std::time::{Duration, Instant};

use fqdemux_metrics::{UNMATCHED_LABEL, format_count};

use crate::router::RoutingCounts;

/// Formats a fraction as a percentage with `decimals` decimal places.
///
/// # Examples
///
/// ```
/// use fqdemux_lib::logging::format_percent;
///
/// assert_eq!(format_percent(0.9543, 2), "95.43%");
/// assert_eq!(format_percent(1.0, 0), "100%");
/// ```
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", value * 100.0, decimals = decimals)
}

/// Formats a duration as e.g. `45s`, `2m 15s` or `1h 30m`.
///
/// # Examples
///
/// ```
/// use fqdemux_lib::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_secs(135)), "2m 15s");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let (mins, rem) = (secs / 60, secs % 60);
        if rem == 0 { format!("{mins}m") } else { format!("{mins}m {rem}s") }
    } else {
        let (hours, mins) = (secs / 3600, (secs % 3600) / 60);
        if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
    }
}

/// Formats a throughput in templates per second, falling back to per minute for slow rates.
///
/// # Examples
///
/// ```
/// use fqdemux_lib::logging::format_rate;
/// use std::time::Duration;
///
/// assert_eq!(format_rate(1000, Duration::from_secs(1)), "1,000 templates/s");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_rate(count: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        return format!("{} templates/s", format_count(count));
    }

    let rate = count as f64 / secs;
    if rate >= 1.0 {
        format!("{} templates/s", format_count(rate as u64))
    } else {
        format!("{:.1} templates/min", count as f64 / (secs / 60.0))
    }
}

/// Builds the per-barcode summary lines of a demultiplexing run.
///
/// Every barcode is listed with its template count and share of all templates read. The
/// discarded line is only included when templates were actually dropped.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn demux_summary_lines(counts: &RoutingCounts) -> Vec<String> {
    let total = counts.total();
    let share = |n: u64| {
        if total == 0 { format_percent(0.0, 2) } else { format_percent(n as f64 / total as f64, 2) }
    };

    let mut lines = Vec::with_capacity(counts.per_barcode.len() + 3);
    lines.push("Demultiplexing Summary:".to_string());
    lines.push(format!("  Templates read: {}", format_count(total)));
    for (label, templates) in &counts.per_barcode {
        lines.push(format!("  {label}: {} ({})", format_count(*templates), share(*templates)));
    }
    if counts.discarded > 0 {
        lines.push(format!(
            "  {UNMATCHED_LABEL}: {} ({})",
            format_count(counts.discarded),
            share(counts.discarded)
        ));
    }
    lines
}

/// Logs the summary lines of a run at `info`, then warns if any read names disagreed.
pub fn log_demux_summary(counts: &RoutingCounts, name_mismatches: u64) {
    for line in demux_summary_lines(counts) {
        log::info!("{line}");
    }
    if name_mismatches > 0 {
        log::warn!(
            "{} template(s) had read names that differed across input files",
            format_count(name_mismatches)
        );
    }
}

/// Times an operation and logs its start and completion.
///
/// ```no_run
/// use fqdemux_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Demultiplexing");
/// timer.log_completion(10_000);
/// ```
pub struct OperationTimer {
    operation: String,
    start_time: Instant,
}

impl OperationTimer {
    /// Creates a timer and logs the start of `operation`.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} ...");
        Self { operation: operation.to_string(), start_time: Instant::now() }
    }

    /// Time since the timer was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Logs completion with the number of templates processed and the rate.
    pub fn log_completion(&self, count: u64) {
        let duration = self.elapsed();
        log::info!(
            "{} completed: {} templates in {} ({})",
            self.operation,
            format_count(count),
            format_duration(duration),
            format_rate(count, duration)
        );
    }
}
