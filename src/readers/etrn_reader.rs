use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ProcessingError, Result};
use crate::models::field::Field;
use crate::models::signal::{RawObservation, RawSignal};
use crate::readers::{cell, read_text, CorruptRow, SourceRows};
use crate::utils::constants::ETRN_MIN_COLUMNS;

/// Symbol-tagged columns of the hourly table; year, month and day are the last three columns.
const SYMBOL_COLUMNS: [(Field, usize); 12] = [
    (Field::LocalPressure, 1),
    (Field::SeaPressure, 2),
    (Field::Precipitation, 3),
    (Field::Temperature, 4),
    (Field::DewPoint, 5),
    (Field::VaporPressure, 6),
    (Field::Humidity, 7),
    (Field::WindSpeed, 8),
    (Field::WindDirection, 9),
    (Field::Sunshine, 10),
    (Field::Solar, 11),
    (Field::CloudCover, 15),
];

/// Reads hourly tables saved from the per-day observation pages, where quality
/// is carried by markers inside each cell.
pub struct EtrnReader {
    use_mmap: bool,
}

impl EtrnReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    pub fn read_file(&self, path: &Path) -> Result<SourceRows> {
        let content = read_text(path, self.use_mmap)?;
        let rows = self.parse_content(&content);

        if !rows.skipped.is_empty() {
            warn!("{}: skipped {} row(s)", path.display(), rows.skipped.len());
        }
        debug!("{}: {} observations", path.display(), rows.observations.len());

        Ok(rows)
    }

    /// Header rows (anything whose first cell is not an hour) are ignored.
    pub fn parse_content(&self, content: &str) -> SourceRows {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut rows = SourceRows::default();

        for (index, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    rows.skipped.push(CorruptRow {
                        line: index + 1,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            let line = record.position().map_or(index + 1, |p| p.line() as usize);
            let parts: Vec<&str> = record.iter().collect();

            let is_data_row = cell(&parts, 0)
                .and_then(|h| h.parse::<u32>().ok())
                .map_or(false, |h| (1..=24).contains(&h));
            if !is_data_row {
                continue;
            }

            match parse_row(&parts) {
                Ok(observation) => rows.observations.push(observation),
                Err(e) => rows.skipped.push(CorruptRow {
                    line,
                    reason: e.to_string(),
                }),
            }
        }

        rows
    }
}

impl Default for EtrnReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_row(parts: &[&str]) -> Result<RawObservation> {
    if parts.len() < ETRN_MIN_COLUMNS {
        return Err(ProcessingError::InvalidFormat(format!(
            "expected at least {} columns, found {}",
            ETRN_MIN_COLUMNS,
            parts.len()
        )));
    }

    let number = |i: usize, name: &str| -> Result<u32> {
        let text = parts[i].trim();
        text.parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && *v >= 0.0)
            .map(|v| v as u32)
            .ok_or_else(|| ProcessingError::InvalidFormat(format!("{} '{}' is not a number", name, text)))
    };

    let n = parts.len();
    let hour = number(0, "hour")?;
    let year = number(n - 3, "year")?;
    let month = number(n - 2, "month")?;
    let day = number(n - 1, "day")?;

    let date = NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(|| {
        ProcessingError::InvalidFormat(format!("invalid date {}-{}-{}", year, month, day))
    })?;

    Ok(SYMBOL_COLUMNS
        .iter()
        .fold(RawObservation::new(date, hour), |observation, (field, column)| {
            let token = cell(parts, *column).unwrap_or("");
            observation.with_signal(*field, RawSignal::symbol(token))
        }))
}
