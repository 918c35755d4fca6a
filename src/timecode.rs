//! SRT timecodes.
//!
//! All fields come from a single truncated millisecond count, so the
//! seconds field and the millisecond field can never disagree at a
//! whole-second boundary. Hours are not wrapped at 24.

const MILLIS_PER_HOUR: u64 = 3_600_000;
const MILLIS_PER_MINUTE: u64 = 60_000;
const MILLIS_PER_SECOND: u64 = 1_000;

/// Truncate a seconds offset to whole milliseconds. Negative and NaN map to zero.
pub fn to_millis(seconds: f64) -> u64 {
    // `as` saturates: NaN and negatives become 0
    (seconds * 1000.0) as u64
}

/// Format seconds as `HH:MM:SS,mmm`
pub fn format_timestamp(seconds: f64) -> String {
    let total_milliseconds = to_millis(seconds);
    let hours = total_milliseconds / MILLIS_PER_HOUR;
    let minutes = (total_milliseconds % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
    let secs = (total_milliseconds % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND;
    let millis = total_milliseconds % MILLIS_PER_SECOND;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
