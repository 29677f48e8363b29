use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ProcessingError, Result};
use crate::models::field::Field;
use crate::models::signal::{RawObservation, RawSignal};
use crate::readers::{cell, read_text, CorruptRow, SourceRows};
use crate::utils::constants::{OBSDL_HEADER_LINES, OBSDL_MIN_COLUMNS};

/// Column of the value for a field laid out as value, quality, homogeneity.
const SIMPLE_COLUMNS: [(Field, usize); 7] = [
    (Field::LocalPressure, 1),
    (Field::SeaPressure, 4),
    (Field::Temperature, 11),
    (Field::DewPoint, 14),
    (Field::VaporPressure, 17),
    (Field::Humidity, 20),
    (Field::Solar, 32),
];

/// Column of the value for a field laid out as value, phenomenon-absent, quality, homogeneity.
const PHENOMENON_COLUMNS: [(Field, usize); 2] = [(Field::Precipitation, 7), (Field::Sunshine, 28)];

const WIND_SPEED_COLUMN: usize = 23;
const WIND_DIRECTION_COLUMN: usize = 25;
const CLOUD_COLUMN: usize = 35;

/// Reads numeric-quality CSV downloads: six header lines, then one row per hour
/// with explicit quality and phenomenon-absent columns.
pub struct ObsdlReader {
    header_lines: usize,
    use_mmap: bool,
}

impl ObsdlReader {
    pub fn new() -> Self {
        Self {
            header_lines: OBSDL_HEADER_LINES,
            use_mmap: false,
        }
    }

    pub fn with_header_lines(header_lines: usize) -> Self {
        Self {
            header_lines,
            use_mmap: false,
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
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

    pub fn parse_content(&self, content: &str) -> SourceRows {
        let mut rows = SourceRows::default();

        for (index, line) in content.lines().enumerate().skip(self.header_lines) {
            if line.trim().is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.split(',').collect();
            match self.parse_row(&parts) {
                Ok(observation) => {
                    if parts.len() < OBSDL_MIN_COLUMNS {
                        debug!(
                            "line {}: {} of {} columns, absent columns read as not observed",
                            index + 1,
                            parts.len(),
                            OBSDL_MIN_COLUMNS
                        );
                        rows.short_rows += 1;
                    }
                    rows.observations.push(observation);
                }
                Err(e) => rows.skipped.push(CorruptRow {
                    line: index + 1,
                    reason: e.to_string(),
                }),
            }
        }

        rows
    }

    /// Only the timestamp is required; cells past the end of a short row become absent signals.
    fn parse_row(&self, parts: &[&str]) -> Result<RawObservation> {
        let timestamp = cell(parts, 0)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProcessingError::InvalidFormat("missing timestamp".to_string()))?;
        let (date, hour) = parse_timestamp(timestamp)?;
        let mut observation = RawObservation::new(date, hour);

        for (field, column) in SIMPLE_COLUMNS {
            observation = observation.with_signal(field, numeric(parts, column, column + 1, None));
        }
        for (field, column) in PHENOMENON_COLUMNS {
            observation = observation.with_signal(
                field,
                numeric(parts, column, column + 2, Some(column + 1)),
            );
        }

        Ok(observation
            .with_signal(
                Field::WindSpeed,
                numeric(parts, WIND_SPEED_COLUMN, WIND_SPEED_COLUMN + 1, None),
            )
            .with_signal(
                Field::WindDirection,
                numeric(parts, WIND_DIRECTION_COLUMN, WIND_DIRECTION_COLUMN + 1, None),
            )
            .with_signal(
                Field::CloudCover,
                numeric(parts, CLOUD_COLUMN, CLOUD_COLUMN + 1, None),
            ))
    }
}

impl Default for ObsdlReader {
    fn default() -> Self {
        Self::new()
    }
}

fn numeric(parts: &[&str], value: usize, quality: usize, phenomenon: Option<usize>) -> RawSignal {
    RawSignal::numeric(
        cell(parts, value),
        cell(parts, quality),
        phenomenon.and_then(|i| cell(parts, i)),
    )
}

/// Parses `YYYY/M/D H:MM[:SS]`; midnight becomes hour 24 of the previous day.
pub fn parse_timestamp(text: &str) -> Result<(NaiveDate, u32)> {
    let timestamp = NaiveDateTime::parse_from_str(text, "%Y/%m/%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y/%m/%d %H:%M"))?;

    if timestamp.hour() == 0 {
        Ok(((timestamp - Duration::days(1)).date(), 24))
    } else {
        Ok((timestamp.date(), timestamp.hour()))
    }
}
