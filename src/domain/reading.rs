// Sensor reading domain models
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const TEMPERATURE_COLUMN: &str = "TC";

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to read data file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("row {row}: cannot parse timestamp `{value}`")]
    InvalidTimestamp { row: usize, value: String },
    #[error("row {row}: cannot parse TC value `{value}`")]
    InvalidTemperature { row: usize, value: String },
}

/// One row of the loaded table. `fields` keeps every raw column value in
/// header order, including the two parsed ones. The charts only read the
/// parsed pair.
#[derive(Debug, Clone)]
pub struct DatasetRow {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    #[cfg_attr(not(test), allow(dead_code))]
    pub fields: Vec<String>,
}

/// The loaded CSV table, rows in file order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<DatasetRow>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<DatasetRow>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw value of `column` in row `index`
    #[cfg(test)]
    pub fn field(&self, index: usize, column: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows
            .get(index)
            .and_then(|row| row.fields.get(col))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub timestamp: NaiveDateTime,
    pub tc: f64,
}

impl SensorReading {
    pub fn new(timestamp: NaiveDateTime, tc: f64) -> Self {
        Self { timestamp, tc }
    }

    pub fn time_ms(&self) -> i64 {
        self.timestamp.and_utc().timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

impl From<&SensorReading> for TimeSeriesPoint {
    fn from(reading: &SensorReading) -> Self {
        Self::new(reading.time_ms(), reading.tc)
    }
}

/// Ordered (timestamp, TC) pairs projected out of a [`Dataset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureSeries {
    readings: Vec<SensorReading>,
}

impl TemperatureSeries {
    pub fn new(readings: Vec<SensorReading>) -> Self {
        Self { readings }
    }

    pub fn readings(&self) -> &[SensorReading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Smallest and largest finite TC, or `None` when there is none
    pub fn temperature_range(&self) -> Option<(f64, f64)> {
        self.readings
            .iter()
            .map(|r| r.tc)
            .filter(|tc| tc.is_finite())
            .fold(None, |range, tc| match range {
                None => Some((tc, tc)),
                Some((lo, hi)) => Some((tc.min(lo), tc.max(hi))),
            })
    }

    pub fn points(&self) -> Vec<TimeSeriesPoint> {
        self.readings.iter().map(TimeSeriesPoint::from).collect()
    }
}

pub fn project_temperature_series(dataset: &Dataset) -> TemperatureSeries {
    TemperatureSeries::new(
        dataset
            .rows()
            .iter()
            .map(|row| SensorReading::new(row.timestamp, row.temperature))
            .collect(),
    )
}
