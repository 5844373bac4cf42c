//! Human-readable elapsed time formatting
//!
//! Used for the durations in stage progress messages. Sub-second values are
//! shown as whole units (`ns`, `µs`, `ms`); anything longer uses one decimal
//! place in the coarsest unit that keeps the number small.

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: u128 = 24 * NANOS_PER_HOUR;

/// Format a nanosecond count, from `ns` up to days.
///
/// # Examples
///
/// ```
/// use xrep_common::human_time::format_time_ns;
///
/// assert_eq!(format_time_ns(999), "999 ns");
/// assert_eq!(format_time_ns(1_500), "1 µs");
/// assert_eq!(format_time_ns(42_000_000), "42 ms");
/// assert_eq!(format_time_ns(1_500_000_000), "1.5 s");
/// assert_eq!(format_time_ns(90 * 1_000_000_000), "1.5 minutes");
/// ```
pub fn format_time_ns(ns: u128) -> String {
    if ns < NANOS_PER_MICRO {
        format!("{} ns", ns)
    } else if ns < NANOS_PER_MILLI {
        format!("{} µs", ns / NANOS_PER_MICRO)
    } else if ns < NANOS_PER_SECOND {
        format!("{} ms", ns / NANOS_PER_MILLI)
    } else if ns < NANOS_PER_MINUTE {
        format!("{:.1} s", ns as f64 / NANOS_PER_SECOND as f64)
    } else if ns < NANOS_PER_HOUR {
        format!("{:.1} minutes", ns as f64 / NANOS_PER_MINUTE as f64)
    } else if ns < NANOS_PER_DAY {
        format!("{:.1} hours", ns as f64 / NANOS_PER_HOUR as f64)
    } else {
        format!("{:.1} days", ns as f64 / NANOS_PER_DAY as f64)
    }
}
