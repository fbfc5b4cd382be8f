mod aggregate;
mod integrate;
mod resample;

use chrono::{NaiveDateTime, NaiveTime};

pub use self::{aggregate::Aggregate, integrate::Integrate, resample::Resample};
use crate::quantity::power::Kilowatts;

pub type Point<K, V> = (K, V);
pub type Series<K, V> = Vec<Point<K, V>>;

/// Chronological load samples, unique timestamps.
pub type LoadSeries = Series<NaiveDateTime, Kilowatts>;

/// Minute-resolution load keyed by time of day.
pub type DaySeries = Series<NaiveTime, Kilowatts>;
