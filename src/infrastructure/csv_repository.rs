// CSV dataset repository implementation
use crate::application::dataset_repository::DatasetRepository;
use crate::domain::reading::{
    DataLoadError, Dataset, DatasetRow, TEMPERATURE_COLUMN, TIMESTAMP_COLUMN,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::io::Read;
use std::path::Path;

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

#[derive(Debug, Clone, Default)]
pub struct CsvDatasetRepository;

impl CsvDatasetRepository {
    pub fn new() -> Self {
        Self
    }

    /// Parse a CSV table with a header row. Requires the `timestamp` and
    /// `TC` columns; every other column is kept as raw text.
    pub fn parse<R: Read>(reader: R) -> Result<Dataset, DataLoadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let column = |name: &'static str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or(DataLoadError::MissingColumn(name))
        };
        let time_idx = column(TIMESTAMP_COLUMN)?;
        let tc_idx = column(TEMPERATURE_COLUMN)?;

        let mut rows = Vec::new();
        for (index, record) in rdr.records().enumerate() {
            let record = record?;
            let row = index + 1;

            let raw_time = record.get(time_idx).unwrap_or_default();
            let timestamp =
                parse_timestamp(raw_time).ok_or_else(|| DataLoadError::InvalidTimestamp {
                    row,
                    value: raw_time.to_string(),
                })?;

            let raw_tc = record.get(tc_idx).unwrap_or_default();
            // NaN and infinities parse as f64 but are not readings
            let temperature = raw_tc
                .parse::<f64>()
                .ok()
                .filter(|tc| tc.is_finite())
                .ok_or_else(|| DataLoadError::InvalidTemperature {
                    row,
                    value: raw_tc.to_string(),
                })?;

            rows.push(DatasetRow {
                timestamp,
                temperature,
                fields: record.iter().map(str::to_string).collect(),
            });
        }

        Ok(Dataset::new(columns, rows))
    }
}

#[async_trait]
impl DatasetRepository for CsvDatasetRepository {
    async fn load_dataset(&self, path: &Path) -> Result<Dataset, DataLoadError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| DataLoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let dataset = Self::parse(bytes.as_slice())?;
        if dataset.is_empty() {
            tracing::warn!("{} has a header but no readings", path.display());
        }
        tracing::debug!(
            "Loaded {} rows ({} columns) from {}",
            dataset.len(),
            dataset.columns().len(),
            path.display()
        );
        Ok(dataset)
    }
}

/// Parse a timestamp cell. Values carrying an offset are normalised to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
timestamp,TC,HUM,SOIL
2024-01-05 10:00:00,21.5,40,310
2024-01-05 09:00:00,19.25,42,305
2024-01-05 11:30:00,23,38,300
";

    fn ts(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_parse_keeps_rows_in_file_order() {
        let dataset = CsvDatasetRepository::parse(SAMPLE.as_bytes()).unwrap();

        assert_eq!(dataset.columns(), &["timestamp", "TC", "HUM", "SOIL"]);
        assert_eq!(dataset.len(), 3);
        let rows: Vec<(NaiveDateTime, f64)> = dataset
            .rows()
            .iter()
            .map(|r| (r.timestamp, r.temperature))
            .collect();
        assert_eq!(
            rows,
            vec![
                (ts("2024-01-05 10:00:00"), 21.5),
                (ts("2024-01-05 09:00:00"), 19.25),
                (ts("2024-01-05 11:30:00"), 23.0),
            ]
        );
        assert_eq!(dataset.field(2, "SOIL"), Some("300"));
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let dataset = CsvDatasetRepository::parse("timestamp,TC\n".as_bytes()).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_missing_temperature_column() {
        let err = CsvDatasetRepository::parse("timestamp,HUM\n2024-01-05,40\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn("TC")));
    }

    #[test]
    fn test_missing_timestamp_column() {
        let err = CsvDatasetRepository::parse("time,TC\n2024-01-05,20\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn("timestamp")));
    }

    #[test]
    fn test_bad_cells_report_row() {
        let err = CsvDatasetRepository::parse(
            "timestamp,TC\n2024-01-05 10:00:00,20\nyesterday,21\n".as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::InvalidTimestamp { row: 2, ref value } if value == "yesterday"
        ));

        let err = CsvDatasetRepository::parse("timestamp,TC\n2024-01-05 10:00:00,warm\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidTemperature { row: 1, .. }));
    }

    #[test]
    fn test_non_finite_temperature_is_rejected() {
        for raw in ["NaN", "inf", "-infinity", ""] {
            let csv = format!("timestamp,TC\n2024-01-05 10:00:00,20\n2024-01-05 11:00:00,{raw}\n");
            let err = CsvDatasetRepository::parse(csv.as_bytes()).unwrap_err();
            assert!(
                matches!(err, DataLoadError::InvalidTemperature { row: 2, ref value } if value == raw),
                "{raw}: {err}"
            );
        }
    }

    #[test]
    fn test_ragged_rows_are_malformed() {
        let err = CsvDatasetRepository::parse("timestamp,TC\n2024-01-05 10:00:00,20,extra\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, DataLoadError::Csv(_)));
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = ts("2024-01-05 10:15:00");
        for raw in [
            "2024-01-05 10:15:00",
            "2024-01-05T10:15:00",
            "2024-01-05 10:15",
            "2024/01/05 10:15:00",
            "2024-01-05T12:15:00+02:00",
            "2024-01-05T10:15:00Z",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "{raw}");
        }
        assert_eq!(
            parse_timestamp("2024-01-05 10:15:00.250"),
            Some(expected + chrono::Duration::milliseconds(250))
        );
        assert_eq!(parse_timestamp("2024-01-05"), Some(ts("2024-01-05 00:00:00")));
        assert_eq!(parse_timestamp("05.01.2024"), None);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let dataset = CsvDatasetRepository::new()
            .load_dataset(file.path())
            .await
            .unwrap();
        assert_eq!(dataset.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned_data.csv");

        let err = CsvDatasetRepository::new()
            .load_dataset(&path)
            .await
            .unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }));
        assert!(err.to_string().contains("cleaned_data.csv"));
    }
}
