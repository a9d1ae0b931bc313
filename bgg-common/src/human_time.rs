//! Human-readable elapsed time formatting

use std::time::Duration;

/// Format an elapsed run time.
///
/// - `>= 1h` → `Hh Mm Ss`
/// - `>= 1m` → `Mm Ss`
/// - otherwise `Ss`
///
/// # Examples
///
/// ```
/// use bgg_common::human_time::format_elapsed;
/// use std::time::Duration;
///
/// assert_eq!(format_elapsed(Duration::from_secs(42)), "42s");
/// assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 5s");
/// assert_eq!(format_elapsed(Duration::from_secs(3723)), "1h 2m 3s");
/// ```
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours >= 1 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes >= 1 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
