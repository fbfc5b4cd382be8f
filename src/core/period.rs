use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::{
    core::{SizingError, series::DaySeries},
    quantity::power::Kilowatts,
};

/// Range of whole hours within a day. A period whose start is after its end wraps around midnight.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Period {
    start_hour: u32,
    end_hour: u32,
}

impl Period {
    pub fn try_new(start_hour: u32, end_hour: u32) -> Result<Self, SizingError> {
        if start_hour >= 24 {
            return Err(SizingError::HourOutOfRange { hour: start_hour });
        }
        if end_hour >= 24 {
            return Err(SizingError::HourOutOfRange { hour: end_hour });
        }
        if start_hour == end_hour {
            return Err(SizingError::InvalidPeriod { start: start_hour, end: end_hour });
        }
        Ok(Self { start_hour, end_hour })
    }

    pub const fn is_wrapping(self) -> bool {
        self.start_hour > self.end_hour
    }

    /// Whether the period covers the time of day.
    ///
    /// The end hour is inclusive for a plain period, and exclusive for a wrapping one.
    pub fn contains(self, time: NaiveTime) -> bool {
        let start = Self::time(self.start_hour);
        let end = Self::time(self.end_hour);
        if self.is_wrapping() {
            time >= start || time < end
        } else {
            start <= time && time <= end
        }
    }

    /// Whether any minute of the day is covered by both periods.
    pub fn overlaps(self, other: Self) -> bool {
        (0..24 * 60)
            .filter_map(|minute| NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0))
            .any(|time| self.contains(time) && other.contains(time))
    }

    /// Select the loads which fall into the period, in the time-of-day order.
    pub fn extract(self, day: &DaySeries) -> Vec<Kilowatts> {
        day.iter().filter(|(time, _)| self.contains(*time)).map(|(_, value)| *value).collect()
    }

    fn time(hour: u32) -> NaiveTime {
        NaiveTime::MIN.with_hour(hour).unwrap_or(NaiveTime::MIN)
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:00-{:02}:00", self.start_hour, self.end_hour)
    }
}

impl FromStr for Period {
    type Err = SizingError;

    /// Parse `START-END`, for example: `22-6`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || SizingError::MalformedPeriod { value: value.to_owned() };
        let (start, end) = value.split_once('-').ok_or_else(malformed)?;
        let start = start.trim().parse().map_err(|_| malformed())?;
        let end = end.trim().parse().map_err(|_| malformed())?;
        Self::try_new(start, end)
    }
}
