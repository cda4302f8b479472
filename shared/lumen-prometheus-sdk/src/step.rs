//! Step calculation for range queries

use std::fmt;

use lumen_core::TimeRange;

/// Number of points a range query should return, approximately
pub const TARGET_POINTS: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepUnit {
    Seconds,
    Minutes,
    Hours,
}

impl StepUnit {
    pub fn seconds(&self) -> u64 {
        match self {
            StepUnit::Seconds => 1,
            StepUnit::Minutes => 60,
            StepUnit::Hours => 3_600,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            StepUnit::Seconds => "s",
            StepUnit::Minutes => "m",
            StepUnit::Hours => "h",
        }
    }
}

/// Query resolution, e.g. `2m`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub amount: u64,
    pub unit: StepUnit,
}

impl Step {
    /// Step length in whole seconds
    pub fn seconds(&self) -> u64 {
        self.amount * self.unit.seconds()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

/// Pick the step that splits `range` into roughly [`TARGET_POINTS`] buckets.
///
/// Escalates from seconds to minutes to hours while the raw step is at
/// least 60 of the current unit, then rounds up. Never returns less than
/// one unit, so empty or inverted ranges still produce a usable step.
pub fn calculate_step(range: &TimeRange) -> Step {
    let mut raw = range.duration_secs() / TARGET_POINTS;
    let mut unit = StepUnit::Seconds;

    if raw >= 60.0 {
        raw /= 60.0;
        unit = StepUnit::Minutes;

        if raw >= 60.0 {
            raw /= 60.0;
            unit = StepUnit::Hours;
        }
    }

    let amount = if raw > 1.0 { raw.ceil() as u64 } else { 1 };
    Step { amount, unit }
}
