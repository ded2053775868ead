use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde_json::Value;

// ============================================================================
// Spreadsheet serial dates
// ============================================================================

/// Day zero of spreadsheet serial dates (1899-12-30)
pub fn excel_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Convert a spreadsheet serial number (fractional days) to a timestamp
pub fn excel_serial_to_datetime(days: f64) -> Option<NaiveDateTime> {
    if !days.is_finite() {
        return None;
    }
    let micros = (days * 86_400_000_000.0).round();
    if micros.abs() > i64::MAX as f64 {
        return None;
    }
    excel_epoch().checked_add_signed(Duration::microseconds(micros as i64))
}

// ============================================================================
// ISO 8601
// ============================================================================

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO 8601 date or date-time, accepting a trailing `Z`.
///
/// Date-only input resolves to midnight. Offsets are dropped and the local
/// wall-clock time is kept.
pub fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let text = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_local())
}

/// Parse a strict `YYYY-MM-DD` date
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Interpret a row cell as a timestamp: ISO text or a spreadsheet serial
pub fn timestamp_from_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => n.as_f64().and_then(excel_serial_to_datetime),
        Value::String(s) => parse_iso_datetime(s).or_else(|| {
            s.trim()
                .parse::<f64>()
                .ok()
                .and_then(excel_serial_to_datetime)
        }),
        _ => None,
    }
}

/// Second-precision ISO 8601 with a literal `Z` suffix (sub-seconds dropped)
pub fn format_iso_z(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Round to the nearest whole second, half a second rounding up
pub fn round_to_second(dt: NaiveDateTime) -> NaiveDateTime {
    let carry = dt.nanosecond() >= 500_000_000;
    let truncated = dt.with_nanosecond(0).unwrap_or(dt);
    if carry {
        truncated + Duration::seconds(1)
    } else {
        truncated
    }
}

/// Fractional minutes as a duration (millisecond resolution).
///
/// `None` when the value is not finite or does not fit a duration.
pub fn minutes(value: f64) -> Option<Duration> {
    let millis = (value * 60_000.0).round();
    if !millis.is_finite() {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}

/// `at` shifted by `offset` minutes; `None` when out of range
pub fn shift_minutes(at: NaiveDateTime, offset: f64) -> Option<NaiveDateTime> {
    at.checked_add_signed(minutes(offset)?)
}

/// Minutes rendered as zero-padded `HH:MM`
pub fn minutes_to_hhmm(total: i64) -> String {
    let hours = total.div_euclid(60);
    let mins = total.rem_euclid(60);
    format!("{:02}:{:02}", hours, mins)
}
