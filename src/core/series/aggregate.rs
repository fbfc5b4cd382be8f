use std::{iter::Sum, ops::Div};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use itertools::Itertools;

use crate::core::series::Series;

impl<T> Aggregate for T where T: ?Sized {}

pub trait Aggregate {
    /// Arithmetic mean of the values, or `None` when there are none.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    fn mean<K, V>(self) -> Option<V>
    where
        Self: Sized + Iterator<Item = (K, V)>,
        V: Sum + Div<f64, Output = V>,
    {
        let values = self.map(|(_, value)| value).collect_vec();
        if values.is_empty() {
            None
        } else {
            let n_values = values.len() as f64;
            Some(values.into_iter().sum::<V>() / n_values)
        }
    }

    /// Split a chronological series into calendar days.
    #[must_use]
    fn group_daily<V>(self) -> Vec<(NaiveDate, Series<NaiveDateTime, V>)>
    where
        Self: Sized + Iterator<Item = (NaiveDateTime, V)>,
    {
        let chunks = self.chunk_by(|(timestamp, _)| timestamp.date());
        chunks.into_iter().map(|(date, points)| (date, points.collect_vec())).collect()
    }

    /// Average the values sharing the same time of day, ordered by the time of day.
    #[must_use]
    fn average_by_time_of_day<V>(self) -> Series<NaiveTime, V>
    where
        Self: Sized + Iterator<Item = (NaiveDateTime, V)>,
        V: Sum + Div<f64, Output = V>,
    {
        self.into_group_map_by(|(timestamp, _)| timestamp.time())
            .into_iter()
            .sorted_unstable_by_key(|(time, _)| *time)
            .filter_map(|(time, points)| points.into_iter().mean().map(|mean| (time, mean)))
            .collect()
    }
}
