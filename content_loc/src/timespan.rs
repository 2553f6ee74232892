//! Minutes-and-seconds timespans as typed into and shown by round timers.

use std::time::Duration;

/// Accepted input shapes: minutes with seconds, or bare minutes.
pub const TIMESPAN_MINUTES_FORMATS: [&str; 4] = ["m:ss", "mm:ss", "m", "mm"];

const SECONDS_PER_MINUTE: u64 = 60;

/// Parses `m:ss`, `mm:ss`, `m`, or `mm`. Minutes and seconds must both be
/// below 60 and seconds always take two digits.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use content_loc::parse_minutes_timespan;
///
/// assert_eq!(parse_minutes_timespan("5:07"), Some(Duration::from_secs(307)));
/// assert_eq!(parse_minutes_timespan("5:7"), None);
/// ```
#[must_use]
pub fn parse_minutes_timespan(text: &str) -> Option<Duration> {
    let (minute_digits, second_digits) = match text.split_once(':') {
        Some((head, tail)) => (head, Some(tail)),
        None => (text, None),
    };
    let minutes = parse_field(minute_digits, 1..=2)?;
    let seconds = second_digits.map_or(Some(0), |digits| parse_field(digits, 2..=2))?;
    Some(Duration::from_secs(minutes * SECONDS_PER_MINUTE + seconds))
}

/// Renders whole minutes and seconds as `m:ss`. Sub-second precision is
/// dropped; minutes are not wrapped into hours.
#[must_use]
pub fn format_minutes_timespan(duration: Duration) -> String {
    let total = duration.as_secs();
    format!(
        "{}:{:02}",
        total.div_euclid(SECONDS_PER_MINUTE),
        total.rem_euclid(SECONDS_PER_MINUTE)
    )
}

fn parse_field(digits: &str, width: std::ops::RangeInclusive<usize>) -> Option<u64> {
    if !width.contains(&digits.len()) || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits
        .parse::<u64>()
        .ok()
        .filter(|value| *value < SECONDS_PER_MINUTE)
}
