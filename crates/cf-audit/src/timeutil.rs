//! CF time-unit decoding.
//!
//! Turns `"<unit> since <epoch>"` units plus a numeric offset into a
//! UTC timestamp. Only fixed-length calendar units decode; month/year
//! offsets are calendar-dependent and callers fall back to numeric
//! labels for them.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Seconds per unit for the fixed-length CF time units.
fn unit_seconds(unit: &str) -> Option<f64> {
    match unit.to_ascii_lowercase().as_str() {
        "second" | "seconds" => Some(1.0),
        "minute" | "minutes" => Some(60.0),
        "hour" | "hours" => Some(3_600.0),
        "day" | "days" => Some(86_400.0),
        _ => None,
    }
}

/// Parse the epoch part of a CF time-units string.
fn parse_epoch(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim().trim_end_matches('Z');
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Decode one coordinate value against CF time units.
///
/// Returns `None` when the units are not decodable (wrong shape,
/// month/year offsets, unparseable epoch, non-finite value).
pub fn decode_time_value(units: &str, value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let (unit, rest) = units.trim().split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    let epoch_text = rest
        .strip_prefix("since")
        .or_else(|| rest.strip_prefix("Since"))
        .or_else(|| rest.strip_prefix("SINCE"))?;
    let seconds_per_unit = unit_seconds(unit)?;
    let epoch = parse_epoch(epoch_text)?;

    let offset_ms = value * seconds_per_unit * 1_000.0;
    if !offset_ms.is_finite() || offset_ms.abs() > i64::MAX as f64 {
        return None;
    }
    let timestamp = Utc.from_utc_datetime(&epoch) + Duration::milliseconds(offset_ms as i64);
    Some(timestamp)
}

/// Human-readable label for a time coordinate value: RFC 3339 when the
/// units decode, the raw number otherwise.
pub fn time_label(units: Option<&str>, value: f64) -> String {
    units
        .and_then(|units| decode_time_value(units, value))
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_else(|| format!("{}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_days_since_epoch() {
        let ts = decode_time_value("days since 1970-01-01", 1.0).unwrap();
        assert_eq!(ts.to_rfc3339(), "1970-01-02T00:00:00+00:00");
    }

    #[test]
    fn test_decode_hours_with_time_part() {
        let ts = decode_time_value("hours since 2000-01-01 12:00:00", 6.0).unwrap();
        assert_eq!(ts.to_rfc3339(), "2000-01-01T18:00:00+00:00");
    }

    #[test]
    fn test_month_units_do_not_decode() {
        assert!(decode_time_value("months since 2000-01-01", 1.0).is_none());
        assert!(decode_time_value("furlongs since 2000-01-01", 1.0).is_none());
        assert!(decode_time_value("days since someday", 1.0).is_none());
    }

    #[test]
    fn test_label_falls_back_to_number() {
        assert_eq!(time_label(Some("days since 1970-01-01"), 0.0), "1970-01-01T00:00:00+00:00");
        assert_eq!(time_label(Some("days"), 3.5), "3.5");
        assert_eq!(time_label(None, 7.0), "7");
    }
}
