//! Time formatting and small parsing helpers.
//!
//! The status line shows media time and ETA as `HH:MM:SS.s`, trimmed of
//! leading all-zero fields so short encodes read `4.2s` instead of
//! `00:00:04.2s`.

use std::path::Path;

/// Formats seconds as `HH:MM:SS.s`, truncated to tenths (3661.25 -> "01:01:01.2").
///
/// Negative and non-finite values format as zero.
#[must_use]
pub fn format_seconds(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 { seconds } else { 0.0 };

    // The epsilon keeps values like 0.3 from truncating to 0.2 after scaling.
    let tenths = (seconds * 10.0 + 1e-6).floor() as u64;
    let hours = tenths / 36_000;
    let minutes = (tenths / 600) % 60;
    let secs = (tenths / 10) % 60;
    let frac = tenths % 10;

    format!("{hours:02}:{minutes:02}:{secs:02}.{frac}")
}

/// Strips leading zero hour and minute fields from a [`format_seconds`] string
/// and appends the `s` unit.
///
/// `"00:00:04.2"` becomes `"4.2s"`, `"00:01:05.0"` becomes `"01:05.0s"`. The
/// seconds component is always kept, so zero reads `"0.0s"`.
#[must_use]
pub fn trim_leading_zero_units(formatted: &str) -> String {
    let mut rest = formatted.trim_end_matches('s');

    if let Some(without_hours) = rest.strip_prefix("00:") {
        rest = without_hours;
        if let Some(without_minutes) = rest.strip_prefix("00:") {
            rest = without_minutes;
            if let Some(seconds) = rest.strip_prefix('0') {
                if seconds.starts_with(|c: char| c.is_ascii_digit()) {
                    rest = seconds;
                }
            }
        }
    }

    format!("{rest}s")
}

/// Shorthand for `trim_leading_zero_units(&format_seconds(seconds))`.
#[must_use]
pub fn compact_time(seconds: f64) -> String {
    trim_leading_zero_units(&format_seconds(seconds))
}

/// Parses an ffmpeg time string (`HH:MM:SS.ff`) to seconds. Returns None if invalid.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let parts: Vec<&str> = time.trim().split(':').collect();
    if parts.len() == 3 {
        let hours = parts[0].parse::<u64>().ok()?;
        let minutes = parts[1].parse::<u64>().ok()?;
        let seconds = parts[2].parse::<f64>().ok()?;
        if !seconds.is_finite() || seconds < 0.0 {
            return None;
        }
        let whole = hours
            .checked_mul(3600)?
            .checked_add(minutes.checked_mul(60)?)?;
        Some(whole as f64 + seconds)
    } else {
        None
    }
}

/// Parses a frame rate fraction such as `30000/1001` or a plain number.
#[must_use]
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };
    value.is_finite().then_some(value)
}

/// Returns the file name of `path` for display, falling back to the full path.
#[must_use]
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
