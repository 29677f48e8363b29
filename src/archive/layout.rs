//! Positional 33-column archive layout.
//!
//! Identity (code, name, code), calendar (year, month, day, hour 1-24),
//! then a value/remark pair for each field in [`Field::ALL`] order.
//! Null values are empty cells.

use chrono::{Datelike, NaiveDate};

use crate::error::{ProcessingError, Result};
use crate::models::field::Field;
use crate::models::observation::{Measurement, ObservationRecord};
use crate::models::remark::Remark;
use crate::utils::constants::ARCHIVE_COLUMN_COUNT;

pub const ARCHIVE_COLUMNS: [&str; ARCHIVE_COLUMN_COUNT] = [
    "station_code",
    "station_name",
    "station_code_repeat",
    "year",
    "month",
    "day",
    "hour",
    "local_pressure",
    "local_pressure_rmk",
    "sea_pressure",
    "sea_pressure_rmk",
    "temperature",
    "temperature_rmk",
    "vapor_pressure",
    "vapor_pressure_rmk",
    "humidity",
    "humidity_rmk",
    "wind_direction",
    "wind_direction_rmk",
    "wind_speed",
    "wind_speed_rmk",
    "cloud_cover",
    "cloud_cover_rmk",
    "weather",
    "weather_rmk",
    "dew_point",
    "dew_point_rmk",
    "sunshine",
    "sunshine_rmk",
    "solar",
    "solar_rmk",
    "precipitation",
    "precipitation_rmk",
];

const IDENTITY_COLUMNS: usize = 3;
const FIRST_VALUE_COLUMN: usize = 7;

/// Column index of a field's value; its remark follows at `+ 1`.
pub fn value_column(field: Field) -> usize {
    FIRST_VALUE_COLUMN + 2 * field.index()
}

pub fn remark_column(field: Field) -> usize {
    value_column(field) + 1
}

pub fn record_to_cells(record: &ObservationRecord) -> Vec<String> {
    let mut cells = Vec::with_capacity(ARCHIVE_COLUMN_COUNT);
    cells.push(record.station_code.clone());
    cells.push(record.station_name.clone());
    cells.push(record.station_code_repeat.clone());
    cells.push(record.date.year().to_string());
    cells.push(record.date.month().to_string());
    cells.push(record.date.day().to_string());
    cells.push(record.hour.to_string());

    for (_, measurement) in record.measurements() {
        cells.push(measurement.value.map(|v| v.to_string()).unwrap_or_default());
        cells.push(measurement.remark.as_u8().to_string());
    }

    cells
}

pub fn record_from_cells<S: AsRef<str>>(cells: &[S]) -> Result<ObservationRecord> {
    if cells.len() != ARCHIVE_COLUMN_COUNT {
        return Err(ProcessingError::InvalidFormat(format!(
            "expected {} columns, found {}",
            ARCHIVE_COLUMN_COUNT,
            cells.len()
        )));
    }

    let cell = |i: usize| cells[i].as_ref().trim();

    let year: i32 = parse_int(cell(3), ARCHIVE_COLUMNS[3])?;
    let month: u32 = parse_int(cell(4), ARCHIVE_COLUMNS[4])?;
    let day: u32 = parse_int(cell(5), ARCHIVE_COLUMNS[5])?;
    let hour: u32 = parse_int(cell(6), ARCHIVE_COLUMNS[6])?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ProcessingError::InvalidFormat(format!("invalid date {}-{}-{}", year, month, day))
    })?;
    if !(1..=24).contains(&hour) {
        return Err(ProcessingError::InvalidFormat(format!(
            "hour {} outside 1-24",
            hour
        )));
    }

    let mut record = ObservationRecord::with_identity(
        cell(0).to_string(),
        cell(1).to_string(),
        cell(IDENTITY_COLUMNS - 1).to_string(),
        date,
        hour,
    );

    for field in Field::ALL {
        let value = parse_value(cell(value_column(field)), field)?;
        let remark = parse_remark(cell(remark_column(field)), field)?;
        record.set(field, Measurement::new(value, remark));
    }

    Ok(record)
}

fn parse_int<T: std::str::FromStr>(text: &str, column: &str) -> Result<T> {
    text.parse::<T>()
        .map_err(|_| ProcessingError::InvalidFormat(format!("{} '{}' is not an integer", column, text)))
}

fn parse_value(text: &str, field: Field) -> Result<Option<i32>> {
    if text.is_empty() {
        return Ok(None);
    }
    if let Ok(v) = text.parse::<i32>() {
        return Ok(Some(v));
    }

    // tolerate integral floats such as "10084.0"
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(Some(v as i32)),
        _ => Err(ProcessingError::InvalidFormat(format!(
            "{} value '{}' is not an integer",
            field, text
        ))),
    }
}

fn parse_remark(text: &str, field: Field) -> Result<Remark> {
    if text.is_empty() {
        return Ok(Remark::NotObserved);
    }
    let code = text.parse::<u8>().map_err(|_| {
        ProcessingError::InvalidFormat(format!("{} remark '{}' is not a remark code", field, text))
    })?;
    Remark::from_u8(code)
}
