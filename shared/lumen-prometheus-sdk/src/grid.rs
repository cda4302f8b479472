//! Grid alignment of range bounds
//!
//! Range bounds are snapped to multiples of the step so that panning or
//! zooming over overlapping ranges keeps the same bucket boundaries.

use chrono::{DateTime, Utc};
use lumen_core::{epoch_seconds, timestamp_from_millis, LumenError, TimeRange};

use crate::step::Step;
use crate::Result;

/// Snap `ts` to a multiple of `step_seconds` using `rounding`
/// (`f64::floor` for range starts, `f64::ceil` for range ends).
pub fn round_to_grid<F>(ts: &DateTime<Utc>, step_seconds: u64, rounding: F) -> Result<DateTime<Utc>>
where
    F: Fn(f64) -> f64,
{
    if step_seconds == 0 {
        return Err(LumenError::Validation("step must be at least one second".to_string()).into());
    }

    let step = step_seconds as f64;
    let aligned = rounding(epoch_seconds(ts) / step) * step;
    Ok(timestamp_from_millis((aligned * 1000.0).round() as i64)?)
}

/// Floor the start and ceil the end of `range` onto the step grid
pub fn grid_bounds(range: &TimeRange, step: &Step) -> Result<TimeRange> {
    Ok(TimeRange::new(
        round_to_grid(&range.from, step.seconds(), f64::floor)?,
        round_to_grid(&range.to, step.seconds(), f64::ceil)?,
    ))
}
