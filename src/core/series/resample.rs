use std::{
    iter::Sum,
    ops::{Add, Div, Mul, Sub},
};

use chrono::{DurationRound, NaiveDateTime, NaiveTime, TimeDelta};
use itertools::Itertools;

const ONE_MINUTE: TimeDelta = TimeDelta::minutes(1);

impl<T> Resample for T where T: ?Sized {}

pub trait Resample {
    /// Average the samples within each minute, and then fill every missing minute
    /// between two known ones by linear interpolation.
    ///
    /// The input must be sorted by timestamp. The output spans from the first to the last
    /// known minute and is never extrapolated.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    fn resample_minutely<V>(self) -> impl Iterator<Item = (NaiveDateTime, V)>
    where
        Self: Iterator<Item = (NaiveDateTime, V)> + Sized,
        V: Copy + Add<Output = V> + Sub<Output = V> + Mul<f64, Output = V> + Div<f64, Output = V>,
        V: Sum,
    {
        let chunks = self.chunk_by(|(timestamp, _)| floor_minute(*timestamp));
        let buckets = chunks
            .into_iter()
            .map(|(minute, points)| {
                let values = points.map(|(_, value)| value).collect_vec();
                let n_values = values.len() as f64;
                (minute, values.into_iter().sum::<V>() / n_values)
            })
            .collect_vec();
        let last = buckets.last().copied();

        buckets
            .into_iter()
            .tuple_windows()
            .flat_map(|((left_minute, left_value), (right_minute, right_value))| {
                let n_minutes = (right_minute - left_minute).num_minutes();
                let slope = (right_value - left_value) / n_minutes as f64;
                (0..n_minutes).map(move |minute| {
                    (left_minute + TimeDelta::minutes(minute), left_value + slope * minute as f64)
                })
            })
            .chain(last)
    }

    /// Drop the date and keep the time of day.
    fn time_of_day<V>(self) -> impl Iterator<Item = (NaiveTime, V)>
    where
        Self: Iterator<Item = (NaiveDateTime, V)> + Sized,
    {
        self.map(|(timestamp, value)| (timestamp.time(), value))
    }
}

fn floor_minute(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp.duration_trunc(ONE_MINUTE).unwrap_or(timestamp)
}
