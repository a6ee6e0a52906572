//! Elapsed-time and duration formatting shared by the timer and summaries.

/// `h:mm:ss`, with the hour segment dropped while it is zero.
///
/// ```
/// use clearwatch_core::format::format_elapsed;
/// assert_eq!(format_elapsed(65_000), "01:05");
/// assert_eq!(format_elapsed(3_725_000), "1:02:05");
/// ```
pub fn format_elapsed(millis: u64) -> String {
    let total_seconds = millis / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Leading colon plus two-digit hundredths of the sub-second remainder.
pub fn format_millis(millis: u64) -> String {
    format!(":{:02}", (millis % 1000) / 10)
}

/// Compact duration for averages: `1h 2m`, `3m 4s`, `5s`.
pub fn format_duration_with_unit(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
