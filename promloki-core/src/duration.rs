// Human readable durations ("15s", "5m", "2h", "1d") <-> seconds

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DurationError {
    #[error("duration is empty")]
    Empty,
    #[error("invalid duration: {0}")]
    Invalid(String),
}

// Two-letter suffixes must be tried before their one-letter tails ("ms" before "s").
const UNITS: [(&str, f64); 5] = [
    ("ms", 0.001),
    ("s", 1.0),
    ("m", 60.0),
    ("h", 3600.0),
    ("d", 86400.0),
];

/// Parse a duration string into seconds, failing on anything that is not a
/// non-negative finite number with an optional unit suffix.
pub fn parse_duration_strict(text: &str) -> Result<f64, DurationError> {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        return Err(DurationError::Empty);
    }

    let (body, factor) = UNITS
        .iter()
        .find_map(|(suffix, factor)| t.strip_suffix(suffix).map(|body| (body, *factor)))
        .unwrap_or((t.as_str(), 1.0));

    let value: f64 = body
        .trim()
        .parse()
        .map_err(|_| DurationError::Invalid(text.to_string()))?;

    if !value.is_finite() || value < 0.0 {
        return Err(DurationError::Invalid(text.to_string()));
    }

    Ok(value * factor)
}

/// Lenient wrapper around [`parse_duration_strict`]: absent, empty or
/// unparseable input yields `default`.
pub fn parse_duration(text: Option<&str>, default: f64) -> f64 {
    match text {
        None | Some("") => default,
        Some(t) => parse_duration_strict(t).unwrap_or(default),
    }
}

/// Render seconds using the coarsest of h/m/s that represents the value exactly.
pub fn render_duration(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };

    if secs == 0 {
        // zero-length steps mean nothing to the backends
        return "1s".to_string();
    }
    if secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
