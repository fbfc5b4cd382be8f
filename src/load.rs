use std::{fs::File, io::Read, path::Path};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use itertools::Itertools;

use crate::{
    core::{
        Diagnosed,
        SizingError,
        Warning,
        series::{Aggregate, LoadSeries},
    },
    prelude::*,
    quantity::power::parse_reading,
};

const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Names of the timestamp and value columns, the first and second column by default.
#[derive(Clone, Debug, Default)]
pub struct Columns {
    pub index: Option<String>,
    pub value: Option<String>,
}

impl Columns {
    fn resolve(&self, header: &StringRecord) -> Result<(usize, usize), SizingError> {
        let position = |name: Option<&String>, default: usize| match name {
            Some(name) => header
                .iter()
                .position(|column| column == name)
                .ok_or_else(|| SizingError::MissingColumn { name: name.clone() }),
            None if default < header.len() => Ok(default),
            None => Err(SizingError::MissingColumn { name: format!("#{}", default + 1) }),
        };
        Ok((position(self.index.as_ref(), 0)?, position(self.value.as_ref(), 1)?))
    }
}

/// Parse a timestamp. An offset, if any, is dropped and the wall-clock time is kept.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, SizingError> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.naive_local());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| SizingError::InvalidTimestamp { value: value.to_owned() })
}

#[instrument(skip(columns))]
pub fn read_load_file(path: &Path, columns: &Columns) -> Result<Diagnosed<LoadSeries>> {
    let file = File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    read_load_series(file, columns)
}

/// Read a chronological load series from a CSV table with a header row.
///
/// Duplicate timestamps are averaged.
pub fn read_load_series(reader: impl Read, columns: &Columns) -> Result<Diagnosed<LoadSeries>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let header = reader.headers().context("failed to read the header")?.clone();
    let (index_column, value_column) = columns.resolve(&header)?;

    let mut n_missing_units = 0;
    let mut samples = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // The header is the first row:
        let row = i + 2;
        let record = record.with_context(|| format!("failed to read row #{row}"))?;
        let timestamp = parse_timestamp(record.get(index_column).unwrap_or_default())
            .with_context(|| format!("bad timestamp in row #{row}"))?;
        let reading = parse_reading(record.get(value_column).unwrap_or_default())
            .with_context(|| format!("bad value in row #{row}"))?;
        for warning in reading.warnings {
            if let Warning::MissingUnit { n_values } = warning {
                n_missing_units += n_values;
            }
        }
        samples.push((timestamp, reading.value));
    }
    ensure!(!samples.is_empty(), SizingError::EmptySeries);

    samples.sort_by_key(|(timestamp, _)| *timestamp);
    let mut n_duplicates = 0;
    let chunks = samples.into_iter().chunk_by(|(timestamp, _)| *timestamp);
    let series: LoadSeries = chunks
        .into_iter()
        .map(|(timestamp, points)| {
            let points = points.collect_vec();
            if points.len() > 1 {
                n_duplicates += 1;
            }
            (timestamp, points.into_iter().mean().unwrap_or_default())
        })
        .collect();
    info!(
        n_samples = series.len(),
        first = ?series.first().map(|(timestamp, _)| timestamp),
        last = ?series.last().map(|(timestamp, _)| timestamp),
        "loaded the series",
    );

    let mut series = Diagnosed::new(series);
    if n_missing_units != 0 {
        series = series.with_warning(Warning::MissingUnit { n_values: n_missing_units });
    }
    if n_duplicates != 0 {
        series = series.with_warning(Warning::DuplicateTimestamps { n_timestamps: n_duplicates });
    }
    Ok(series)
}
