//! Duration formatting and parsing.
//!
//! Episode lengths are kept as whole seconds everywhere in the crate. This
//! module turns them into the `01h 02m 03s` strings shown in the list, and
//! turns the API's ISO 8601 durations (`PT1H2M3S`) into seconds.

use regex::Regex;
use std::sync::LazyLock;

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("duration pattern is valid")
});

/// Format a number of seconds as `HHh MMm SSs`.
///
/// The hours segment is left out entirely when it is zero; minutes and
/// seconds are always shown and zero-padded to two digits.
///
/// # Examples
///
/// ```
/// use playlist_watcher::duration::format_duration;
///
/// assert_eq!(format_duration(0), "00m 00s");
/// assert_eq!(format_duration(3661), "01h 01m 01s");
/// ```
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{:02}h {:02}m {:02}s", hours, minutes, secs)
    } else {
        format!("{:02}m {:02}s", minutes, secs)
    }
}

/// Parse an ISO 8601 duration such as `PT1H2M3S` into seconds.
///
/// Day components (`P1DT2H`) are accepted as well. Anything that does not
/// match, including the empty string, counts as zero.
pub fn parse_iso8601_duration(value: &str) -> u64 {
    let Some(caps) = ISO_DURATION.captures(value.trim()) else {
        return 0;
    };

    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    part(1)
        .saturating_mul(86_400)
        .saturating_add(part(2).saturating_mul(3600))
        .saturating_add(part(3).saturating_mul(60))
        .saturating_add(part(4))
}
