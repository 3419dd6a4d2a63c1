// Adaptive step selection for range queries

use thiserror::Error;
use tracing::debug;

use crate::duration::{parse_duration, render_duration};

/// Admissible step sizes in seconds, ascending.
pub const CANDIDATE_STEPS: [u64; 22] = [
    1, 2, 5, 10, 15, 30, 60, 120, 300, 600, 900, 1200, 1800, 3600, 7200, 10800, 21600, 43200,
    86400, 172800, 259200, 604800,
];

/// Step used when no point budget is configured and no default step is given.
pub const FALLBACK_STEP: &str = "60s";

const SECONDS_PER_DAY: i128 = 86400;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("invalid time range: end ({end}) must be greater than start ({start})")]
    InvalidRange { start: i64, end: i64 },
}

/// Pick a step for the range `[start, end]` (unix seconds) so that the query
/// returns at most `max_points` samples.
///
/// Without a positive budget the default step (or [`FALLBACK_STEP`]) is
/// returned as-is. Ranges too long for the ladder are rounded up to whole days.
pub fn compute_adaptive_step(
    start: i64,
    end: i64,
    max_points: Option<i64>,
    default_step: Option<&str>,
) -> Result<String, StepError> {
    let range = i128::from(end) - i128::from(start);
    if range <= 0 {
        return Err(StepError::InvalidRange { start, end });
    }

    let max_points = match max_points {
        Some(n) if n > 0 => n,
        _ => {
            let step = default_step.unwrap_or(FALLBACK_STEP).to_string();
            debug!("No point budget, using default step {}", step);
            return Ok(step);
        }
    };

    let ideal = (range as f64 / max_points as f64).max(1.0);
    let step = match CANDIDATE_STEPS.iter().find(|&&c| c as f64 >= ideal) {
        Some(&c) => render_duration(c as f64),
        None => {
            // round up to whole days
            let per_day = i128::from(max_points) * SECONDS_PER_DAY;
            let days = (range + per_day - 1) / per_day;
            format!("{}h", days * 24)
        }
    };
    debug!(
        "Adaptive step: range={}s max_points={} ideal={:.2}s step={}",
        range, max_points, ideal, step
    );
    Ok(step)
}

/// Raise `step` to `min_step` when the configured minimum is coarser.
///
/// Unparseable values on either side leave `step` unchanged.
pub fn apply_min_step(step: &str, min_step: Option<&str>) -> String {
    let Some(min_step) = min_step.filter(|m| !m.trim().is_empty()) else {
        return step.to_string();
    };

    let step_secs = parse_duration(Some(step), f64::NAN);
    let min_secs = parse_duration(Some(min_step), f64::NAN);
    if step_secs < min_secs {
        debug!("Step {} below configured minimum, using {}", step, min_step);
        min_step.trim().to_string()
    } else {
        step.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_hour_sixty_points() {
        assert_eq!(compute_adaptive_step(0, 3600, Some(60), None).unwrap(), "1m");
    }

    #[test]
    fn test_ladder_picks_next_coarser_entry() {
        // ideal 3600/50 = 72s -> 120s
        assert_eq!(compute_adaptive_step(0, 3600, Some(50), None).unwrap(), "2m");
        // ideal 86400/11000 ~ 7.85s -> 10s
        assert_eq!(compute_adaptive_step(0, 86400, Some(11000), None).unwrap(), "10s");
    }

    #[test]
    fn test_sub_second_ideal_is_one_second() {
        assert_eq!(compute_adaptive_step(0, 10, Some(1000), None).unwrap(), "1s");
    }

    #[test]
    fn test_fallback_without_budget() {
        assert_eq!(compute_adaptive_step(0, 3600, None, Some("30s")).unwrap(), "30s");
        assert_eq!(compute_adaptive_step(0, 3600, Some(0), Some("5m")).unwrap(), "5m");
        assert_eq!(compute_adaptive_step(0, 3600, Some(-4), None).unwrap(), "60s");
        assert_eq!(compute_adaptive_step(0, 3600, None, None).unwrap(), FALLBACK_STEP);
    }

    #[test]
    fn test_invalid_range() {
        assert_eq!(
            compute_adaptive_step(100, 50, Some(10), None),
            Err(StepError::InvalidRange { start: 100, end: 50 })
        );
        assert!(compute_adaptive_step(100, 100, Some(10), None).is_err());
        // the range is checked before the fallback branch
        assert!(compute_adaptive_step(100, 50, None, Some("30s")).is_err());
    }

    #[test]
    fn test_beyond_ladder_rounds_up_to_days() {
        // 10_000_000s / 1 point -> 116 days, rendered in hours
        assert_eq!(compute_adaptive_step(0, 10_000_000, Some(1), None).unwrap(), "2784h");
        // exactly one week stays on the ladder
        assert_eq!(compute_adaptive_step(0, 604800, Some(1), None).unwrap(), "168h");
        // just past a week -> 8 days
        assert_eq!(compute_adaptive_step(0, 604801, Some(1), None).unwrap(), "192h");
    }

    #[test]
    fn test_full_i64_range() {
        // (2^64 - 1)s / 10 points, rounded up to whole days
        assert_eq!(
            compute_adaptive_step(i64::MIN, i64::MAX, Some(10), None).unwrap(),
            "512409557603064h"
        );
        assert_eq!(
            compute_adaptive_step(i64::MIN, i64::MAX, Some(1), None).unwrap(),
            "5124095576030448h"
        );

        assert_eq!(
            compute_adaptive_step(i64::MAX, i64::MIN, Some(10), None),
            Err(StepError::InvalidRange {
                start: i64::MAX,
                end: i64::MIN
            })
        );
    }

    #[test]
    fn test_step_is_monotonic_in_range() {
        let mut previous = 0.0;
        for range in [60, 600, 3600, 86400, 604800, 2_592_000, 31_536_000] {
            let step = compute_adaptive_step(0, range, Some(120), None).unwrap();
            let secs = parse_duration(Some(&step), 0.0);
            assert!(secs >= previous, "step shrank at range {}", range);
            assert!(range as f64 / secs <= 120.0);
            previous = secs;
        }
    }

    #[test]
    fn test_apply_min_step() {
        assert_eq!(apply_min_step("15s", Some("1m")), "1m");
        assert_eq!(apply_min_step("5m", Some("1m")), "5m");
        assert_eq!(apply_min_step("1m", Some("60s")), "1m");
        assert_eq!(apply_min_step("15s", None), "15s");
        assert_eq!(apply_min_step("15s", Some("")), "15s");
        assert_eq!(apply_min_step("15s", Some("garbage")), "15s");
    }
}
