//! Timecode helpers for stream offsets.
//!
//! Chat logs and marker files express offsets either as decimal seconds
//! (`754.25`) or as clock strings (`0:12:34`, `12:34`). Hours are not
//! zero-padded and may exceed 23 for long broadcasts.

/// Parse an offset that is either decimal seconds or `[h:]mm:ss[.fff]`.
///
/// Returns `None` for negative, non-finite, or unparsable input.
pub fn parse_offset(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.contains(':') {
        return parse_clock(raw);
    }
    let secs: f64 = raw.parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then_some(secs)
}

/// Parse `h:mm:ss`, `mm:ss`, optionally with fractional seconds.
///
/// Returns `None` when the hour field is too large to represent.
pub fn parse_clock(raw: &str) -> Option<f64> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };

    let hours: u64 = hours.trim().parse().ok()?;
    let minutes: u64 = minutes.trim().parse().ok()?;
    let seconds: f64 = seconds.trim().parse().ok()?;
    if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return None;
    }

    let whole = hours.checked_mul(3600)?.checked_add(minutes * 60)?;
    Some(whole as f64 + seconds)
}

/// Format seconds as `h:mm:ss`, truncating fractional seconds.
pub fn format_clock(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00:00");
        assert_eq!(format_clock(100.0), "0:01:40");
        assert_eq!(format_clock(3661.9), "1:01:01");
        assert_eq!(format_clock(90_000.0), "25:00:00");
        assert_eq!(format_clock(-4.0), "0:00:00");
    }

    #[test]
    fn test_parse_clock_variants() {
        assert_eq!(parse_clock("1:01:01"), Some(3661.0));
        assert_eq!(parse_clock("01:40"), Some(100.0));
        assert_eq!(parse_clock("0:00:05.5"), Some(5.5));
        assert_eq!(parse_clock("0:61:00"), None);
        assert_eq!(parse_clock("a:b:c"), None);
        assert_eq!(parse_clock("1:2:3:4"), None);
    }

    #[test]
    fn test_parse_clock_rejects_overflowing_hours() {
        assert_eq!(parse_clock("99999999999999999:00:00"), None);
        assert_eq!(parse_offset("99999999999999999:00:00"), None);
        assert_eq!(parse_clock("100:00:00"), Some(360_000.0));
    }

    #[test]
    fn test_parse_offset_accepts_seconds_and_clock() {
        assert_eq!(parse_offset("12.5"), Some(12.5));
        assert_eq!(parse_offset(" 0:00:30 "), Some(30.0));
        assert_eq!(parse_offset("-3"), None);
        assert_eq!(parse_offset("NaN"), None);
        assert_eq!(parse_offset(""), None);
    }

    #[test]
    fn test_clock_roundtrip_on_whole_seconds() {
        for secs in [0.0, 59.0, 3599.0, 3600.0, 45_296.0] {
            assert_eq!(parse_clock(&format_clock(secs)), Some(secs));
        }
    }
}
