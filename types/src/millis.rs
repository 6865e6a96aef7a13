//! Loop arithmetic in integer milliseconds.
//!
//! Segment timestamps arrive as decimal seconds. Doing the loop modulo in
//! `f64` accumulates error as the stream loops, so every comparison against
//! the schedule (modulo, window bounds, reuse-key equality) happens on
//! millisecond integers and only the output boundary converts back.

/// Convert decimal seconds to whole milliseconds, rounding half away from
/// zero. Sub-millisecond precision is below the schedule's resolution.
#[must_use]
pub fn from_seconds(seconds: f64) -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    {
        (seconds * 1000.0).round() as i64
    }
}

/// Convert milliseconds back to decimal seconds.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn to_seconds(ms: i64) -> f64 {
    ms as f64 / 1000.0
}

/// Position of `t_ms` within a loop of length `loop_ms`.
/// The result is always in `[0, loop_ms)`.
#[must_use]
pub fn position_in_loop(t_ms: i64, loop_ms: i64) -> i64 {
    t_ms.rem_euclid(loop_ms)
}

/// Render milliseconds as a minimal decimal-seconds string, e.g. `254.3`,
/// `70`, `5.875`. Writers and readers of the loop-position index must agree
/// on this representation for the equality lookup to hit.
#[must_use]
pub fn to_decimal_string(ms: i64) -> String {
    let sign = if ms < 0 { "-" } else { "" };
    let ms = ms.abs();
    let (whole, frac) = (ms / 1000, ms % 1000);
    if frac == 0 {
        format!("{sign}{whole}")
    } else {
        let digits = format!("{frac:03}");
        format!("{sign}{whole}.{}", digits.trim_end_matches('0'))
    }
}
