use chrono::NaiveDate;

use crate::{core::period::Period, quantity::power::Kilowatts};

/// Curve segment which is searched iteratively.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Curve {
    #[display("bottom")]
    Bottom,

    #[display("top")]
    Top,
}

#[derive(Debug, thiserror::Error)]
pub enum SizingError {
    #[error("unknown unit `{unit}` in `{value}`, expected one of: kW, W, mW, µW")]
    UnknownUnit { value: String, unit: String },

    #[error("`{value}` is not a number optionally followed by a unit")]
    InvalidNumber { value: String },

    #[error("`{value}` is not a recognised timestamp")]
    InvalidTimestamp { value: String },

    #[error("column `{name}` is not in the table header")]
    MissingColumn { name: String },

    #[error("the load series is empty")]
    EmptySeries,

    #[error("day {date} is not in the load series")]
    DayNotFound { date: NaiveDate },

    #[error("period {start}-{end} starts and ends at the same hour")]
    InvalidPeriod { start: u32, end: u32 },

    #[error("hour {hour} is out of range, expected 0 to 23")]
    HourOutOfRange { hour: u32 },

    #[error("`{value}` is not a period, expected START-END, for example: 22-6")]
    MalformedPeriod { value: String },

    #[error("period {period} selects no samples from the day")]
    EmptyPeriod { period: Period },

    #[error("capacity step must be a positive number, got {step}")]
    InvalidStep { step: Kilowatts },

    #[error("the iteration limit must be positive")]
    ZeroIterations,

    #[error("the bottom curve was built for a different sizing run")]
    MismatchedBottomCurve,

    #[error("the {curve} curve did not converge within {n_iterations} iterations")]
    NotConverged { curve: Curve, n_iterations: usize },
}
