use std::cmp::Reverse;

use chrono::NaiveDate;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::{
    core::{
        SizingError,
        series::{Aggregate, DaySeries, LoadSeries, Resample},
    },
    prelude::*,
    quantity::power::Kilowatts,
};

/// Number of the highest-average days which make up the synthetic day.
const N_TOP_DAYS: usize = 7;

/// How to pick the day to size for, unless an explicit date is given.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, clap::ValueEnum)]
pub enum DaySelection {
    /// The day of the single highest load sample.
    #[value(name = "peak-load")]
    PeakLoad,

    /// The day with the highest average load.
    #[default]
    #[value(name = "highest-ave")]
    HighestAverage,

    /// Synthetic day averaged over the seven days with the highest average load.
    #[value(name = "highest-7-days")]
    HighestSevenDays,
}

/// The samples of the selected day, still carrying their timestamps.
#[must_use]
pub struct SelectedDay {
    /// Calendar days which contributed to the samples.
    pub dates: Vec<NaiveDate>,

    pub samples: LoadSeries,
}

impl SelectedDay {
    /// Resample to one minute and drop the date.
    pub fn into_day_series(self) -> DaySeries {
        self.samples.into_iter().resample_minutely().time_of_day().collect()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub n_samples: usize,
    pub mean: Kilowatts,
    pub peak: Kilowatts,
}

/// Per-day statistics of a chronological series.
pub fn daily_stats(series: &LoadSeries) -> Vec<DailyStats> {
    series
        .iter()
        .copied()
        .group_daily()
        .into_iter()
        .filter_map(|(date, samples)| {
            let peak =
                samples.iter().map(|(_, value)| *value).max_by_key(|value| OrderedFloat(value.0))?;
            let mean = samples.iter().copied().mean()?;
            Some(DailyStats { date, n_samples: samples.len(), mean, peak })
        })
        .collect()
}

/// Pick the day to size for: the explicit date when given, otherwise per the selection.
///
/// Ties go to the earliest day.
#[instrument(skip_all, fields(n_samples = series.len(), ?date, ?selection))]
pub fn select_day(
    series: &LoadSeries,
    date: Option<NaiveDate>,
    selection: DaySelection,
) -> Result<SelectedDay, SizingError> {
    if series.is_empty() {
        return Err(SizingError::EmptySeries);
    }
    let days = series.iter().copied().group_daily();

    let selected = if let Some(date) = date {
        let (date, samples) = days
            .into_iter()
            .find(|(day, _)| *day == date)
            .ok_or(SizingError::DayNotFound { date })?;
        SelectedDay { dates: vec![date], samples }
    } else {
        match selection {
            DaySelection::PeakLoad => {
                // `max_by_key` returns the last maximum, hence the reversal to prefer the earliest:
                let (peak_timestamp, _) = series
                    .iter()
                    .rev()
                    .max_by_key(|(_, value)| OrderedFloat(value.0))
                    .ok_or(SizingError::EmptySeries)?;
                let peak_date = peak_timestamp.date();
                let (date, samples) = days
                    .into_iter()
                    .find(|(day, _)| *day == peak_date)
                    .ok_or(SizingError::DayNotFound { date: peak_date })?;
                SelectedDay { dates: vec![date], samples }
            }

            DaySelection::HighestAverage => {
                let (date, samples) = rank_days(days)
                    .into_iter()
                    .next()
                    .map(|(date, _, samples)| (date, samples))
                    .ok_or(SizingError::EmptySeries)?;
                SelectedDay { dates: vec![date], samples }
            }

            DaySelection::HighestSevenDays => {
                let top_days = rank_days(days)
                    .into_iter()
                    .take(N_TOP_DAYS)
                    .sorted_by_key(|(date, _, _)| *date)
                    .collect_vec();
                let anchor =
                    top_days.first().map(|(date, _, _)| *date).ok_or(SizingError::EmptySeries)?;
                let samples = top_days
                    .iter()
                    .flat_map(|(_, _, samples)| samples.iter().copied())
                    .average_by_time_of_day()
                    .into_iter()
                    .map(|(time, value)| (anchor.and_time(time), value))
                    .collect();
                SelectedDay { dates: top_days.into_iter().map(|(date, _, _)| date).collect(), samples }
            }
        }
    };

    info!(dates = ?selected.dates, n_samples = selected.samples.len(), "selected the day");
    Ok(selected)
}

/// Order the days by descending mean, keeping the chronological order among equal means.
fn rank_days(days: Vec<(NaiveDate, LoadSeries)>) -> Vec<(NaiveDate, Kilowatts, LoadSeries)> {
    days.into_iter()
        .filter_map(|(date, samples)| {
            samples.iter().copied().mean().map(|mean| (date, mean, samples))
        })
        .sorted_by_key(|(_, mean, _)| Reverse(OrderedFloat(mean.0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDateTime;

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        date(day).and_hms_opt(hour, 0, 0).unwrap()
    }

    /// Hourly series, one entry per day with its hourly loads.
    fn series(days: &[(u32, [f64; 3])]) -> LoadSeries {
        days.iter()
            .flat_map(|(day, loads)| {
                loads.iter().enumerate().map(move |(hour, load)| {
                    (at(*day, u32::try_from(hour).unwrap() * 8), Kilowatts::from(*load))
                })
            })
            .collect()
    }

    #[test]
    fn test_highest_average_dominates() {
        let series = series(&[(1, [1.0, 2.0, 3.0]), (2, [5.0, 5.0, 5.0]), (3, [0.0, 14.0, 0.0])]);
        let selected = select_day(&series, None, DaySelection::HighestAverage).unwrap();
        assert_eq!(selected.dates, [date(2)]);

        let selected_mean = selected.samples.iter().copied().mean().unwrap();
        for stats in daily_stats(&series) {
            assert!(selected_mean >= stats.mean);
        }
    }

    #[test]
    fn test_highest_average_tie_goes_to_earliest() {
        let series = series(&[(1, [1.0, 1.0, 1.0]), (2, [3.0, 3.0, 3.0]), (3, [3.0, 3.0, 3.0])]);
        let selected = select_day(&series, None, DaySelection::HighestAverage).unwrap();
        assert_eq!(selected.dates, [date(2)]);
    }

    #[test]
    fn test_peak_load() {
        let series = series(&[(1, [5.0, 5.0, 5.0]), (2, [0.0, 9.0, 0.0]), (3, [9.0, 0.0, 0.0])]);
        let selected = select_day(&series, None, DaySelection::PeakLoad).unwrap();
        assert_eq!(selected.dates, [date(2)]);
        assert_eq!(selected.samples.len(), 3);
    }

    #[test]
    fn test_explicit_date() {
        let series = series(&[(1, [1.0, 1.0, 1.0]), (2, [2.0, 2.0, 2.0])]);
        let selected = select_day(&series, Some(date(1)), DaySelection::PeakLoad).unwrap();
        assert_eq!(selected.dates, [date(1)]);
        assert!(selected.samples.iter().all(|(timestamp, _)| timestamp.date() == date(1)));
    }

    #[test]
    fn test_explicit_date_not_found() {
        let series = series(&[(1, [1.0, 1.0, 1.0])]);
        let error = select_day(&series, Some(date(5)), DaySelection::default()).err().unwrap();
        assert!(matches!(error, SizingError::DayNotFound { date } if date == self::date(5)));
    }

    #[test]
    fn test_empty_series() {
        let error = select_day(&Vec::new(), None, DaySelection::default()).err().unwrap();
        assert!(matches!(error, SizingError::EmptySeries));
    }

    #[test]
    fn test_highest_seven_days_excludes_lowest() {
        let mut days = (1..=7)
            .map(|day| (day, [f64::from(day) * 10.0, f64::from(day) * 20.0, f64::from(day) * 30.0]))
            .collect_vec();
        days.push((8, [0.5, 0.5, 0.5]));
        let series = series(&days);

        let selected = select_day(&series, None, DaySelection::HighestSevenDays).unwrap();
        assert_eq!(selected.dates, (1..=7).map(date).collect_vec());
        assert_eq!(selected.samples.len(), 3);

        // Anchored to the earliest selected day, averaged over the days 1 to 7 only:
        assert_eq!(selected.samples[0].0, at(1, 0));
        assert_abs_diff_eq!(selected.samples[0].1.0, 40.0);
        assert_abs_diff_eq!(selected.samples[1].1.0, 80.0);
        assert_abs_diff_eq!(selected.samples[2].1.0, 120.0);
    }

    #[test]
    fn test_highest_seven_days_with_fewer_days() {
        let series = series(&[(1, [1.0, 1.0, 1.0]), (2, [3.0, 3.0, 3.0])]);
        let selected = select_day(&series, None, DaySelection::HighestSevenDays).unwrap();
        assert_eq!(selected.dates, [date(1), date(2)]);
        assert_abs_diff_eq!(selected.samples[0].1.0, 2.0);
    }

    #[test]
    fn test_into_day_series() {
        let series = series(&[(1, [0.0, 8.0, 16.0])]);
        let day = select_day(&series, None, DaySelection::default()).unwrap().into_day_series();
        assert_eq!(day.len(), 16 * 60 + 1);
        assert_abs_diff_eq!(day[60].1.0, 1.0);
    }

    #[test]
    fn test_daily_stats() {
        let stats = daily_stats(&series(&[(1, [1.0, 2.0, 6.0]), (2, [4.0, 4.0, 4.0])]));
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].n_samples, 3);
        assert_abs_diff_eq!(stats[0].mean.0, 3.0);
        assert_abs_diff_eq!(stats[0].peak.0, 6.0);
        assert_abs_diff_eq!(stats[1].peak.0, 4.0);
    }
}
