//! RFC3339 timestamps with nanosecond precision, and display rendering of
//! backend epoch timestamps in a fixed UTC offset.
//!
//! Loki takes its range bounds as integer nanoseconds, so parsing is done with
//! exact integer calendar arithmetic rather than through floating point.

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

/// Canonical example quoted in parse errors.
pub const RFC3339_NANO_EXAMPLE: &str = "2025-08-26T12:00:00.123456789Z";

/// Offset (hours east of UTC) used for display timestamps.
pub const DISPLAY_OFFSET_HOURS: i32 = 8;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

static RFC3339_NANO_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})[T ]([0-9]{2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]{1,9}))?(?:([Zz])|([+-])([0-9]{2}):([0-9]{2}))$",
    )
    .expect("Failed to compile RFC3339 regex")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("malformed timestamp '{input}': expected RFC3339Nano with a zone offset, e.g. {example}", example = RFC3339_NANO_EXAMPLE)]
    Malformed { input: String },
}

/// Unit of an epoch timestamp handed to [`render_display_timestamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochUnit {
    Seconds,
    Nanoseconds,
}

/// Precision of the rendered wall-clock string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPrecision {
    /// `YYYY-MM-DD HH:MM:SS`
    Seconds,
    /// `YYYY-MM-DD HH:MM:SS.mmm`
    Millis,
}

/// Parse `YYYY-MM-DD(T| )HH:MM:SS[.fraction](Z|±HH:MM)` into nanoseconds
/// since the Unix epoch.
pub fn parse_rfc3339_nano_to_nanos(text: &str) -> Result<i64, TimestampError> {
    let malformed = || TimestampError::Malformed {
        input: text.to_string(),
    };

    let caps = RFC3339_NANO_REGEX.captures(text).ok_or_else(malformed)?;
    let field = |i: usize| -> Result<i64, TimestampError> {
        caps.get(i)
            .ok_or_else(malformed)?
            .as_str()
            .parse()
            .map_err(|_| malformed())
    };

    let (year, month, day) = (field(1)?, field(2)?, field(3)?);
    let (hour, minute, second) = (field(4)?, field(5)?, field(6)?);

    if !(1..=12).contains(&month)
        || day < 1
        || day > days_in_month(year, month)
        || hour > 23
        || minute > 59
        || second > 59
    {
        return Err(malformed());
    }

    // right-pad the fraction to exactly nine digits
    let fraction = caps.get(7).map_or("", |m| m.as_str());
    let fraction_nanos: i64 = format!("{:0<9}", fraction)
        .parse()
        .map_err(|_| malformed())?;

    let offset_seconds = match caps.get(8) {
        Some(_) => 0,
        None => {
            let (oh, om) = (field(10)?, field(11)?);
            if oh > 23 || om > 59 {
                return Err(malformed());
            }
            let magnitude = oh * 3600 + om * 60;
            if caps.get(9).map(|m| m.as_str()) == Some("-") {
                -magnitude
            } else {
                magnitude
            }
        }
    };

    let provisional =
        days_from_civil(year, month, day) * 86400 + hour * 3600 + minute * 60 + second;
    let epoch_seconds = provisional - offset_seconds;

    epoch_seconds
        .checked_mul(NANOS_PER_SECOND)
        .and_then(|ns| ns.checked_add(fraction_nanos))
        .ok_or_else(malformed)
}

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i64, month: i64) -> i64 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Days since 1970-01-01 in the proleptic Gregorian calendar.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}

/// Render an epoch timestamp as wall-clock time at [`DISPLAY_OFFSET_HOURS`].
///
/// Numbers and numeric strings are converted; anything else is returned
/// unchanged as a string.
pub fn render_display_timestamp(
    value: &Value,
    unit: EpochUnit,
    precision: DisplayPrecision,
) -> String {
    render_display_timestamp_with_offset(value, unit, precision, DISPLAY_OFFSET_HOURS)
}

pub fn render_display_timestamp_with_offset(
    value: &Value,
    unit: EpochUnit,
    precision: DisplayPrecision,
    offset_hours: i32,
) -> String {
    let passthrough = || match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let Some((secs, nanos)) = epoch_parts(value, unit) else {
        return passthrough();
    };
    let Some(offset) = FixedOffset::east_opt(offset_hours * 3600) else {
        return passthrough();
    };
    let Some(utc) = DateTime::from_timestamp(secs, nanos) else {
        return passthrough();
    };

    let local = utc.with_timezone(&offset);
    match precision {
        DisplayPrecision::Seconds => local.format("%Y-%m-%d %H:%M:%S").to_string(),
        DisplayPrecision::Millis => local.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
    }
}

/// Split a JSON epoch value into whole seconds and sub-second nanoseconds.
fn epoch_parts(value: &Value, unit: EpochUnit) -> Option<(i64, u32)> {
    match unit {
        EpochUnit::Seconds => {
            let secs = match value {
                Value::Number(n) => n.as_f64()?,
                Value::String(s) => s.trim().parse::<f64>().ok()?,
                _ => return None,
            };
            if !secs.is_finite() {
                return None;
            }
            let whole = secs.floor();
            let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
            Some((whole as i64, nanos))
        }
        EpochUnit::Nanoseconds => {
            let ns = match value {
                Value::Number(n) => n.as_i64()?,
                Value::String(s) => s.trim().parse::<i64>().ok()?,
                _ => return None,
            };
            Some((
                ns.div_euclid(NANOS_PER_SECOND),
                ns.rem_euclid(NANOS_PER_SECOND) as u32,
            ))
        }
    }
}
