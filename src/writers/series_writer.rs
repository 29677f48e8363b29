use csv::WriterBuilder;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::models::field::Field;
use crate::models::series::SeriesTable;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes reconstructed tables as headed CSV, one column per value and remark.
pub struct SeriesWriter {
    precision: Option<usize>,
}

impl SeriesWriter {
    pub fn new() -> Self {
        Self { precision: None }
    }

    /// Fixed number of decimals for values; shortest round-trip form otherwise.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn header() -> Vec<String> {
        let mut header = vec![
            "timestamp".to_string(),
            "station_code".to_string(),
            "station_name".to_string(),
        ];
        for field in Field::ALL {
            header.push(field.key().to_string());
            header.push(format!("{}_rmk", field.key()));
        }
        header.push("u".to_string());
        header.push("v".to_string());
        header
    }

    pub fn write_to<W: Write>(&self, table: &SeriesTable, writer: W) -> Result<()> {
        let mut csv = WriterBuilder::new().from_writer(writer);
        csv.write_record(Self::header())?;

        for row in &table.rows {
            let mut cells = Vec::with_capacity(3 + 2 * Field::ALL.len() + 2);
            cells.push(row.timestamp.format(TIMESTAMP_FORMAT).to_string());
            cells.push(row.station_code.clone().unwrap_or_default());
            cells.push(row.station_name.clone().unwrap_or_default());
            for field in Field::ALL {
                cells.push(self.format_value(row.value(field)));
                cells.push(
                    row.remark(field)
                        .map(|r| r.as_u8().to_string())
                        .unwrap_or_default(),
                );
            }
            cells.push(self.format_value(row.u));
            cells.push(self.format_value(row.v));
            csv.write_record(&cells)?;
        }
        csv.flush()?;

        Ok(())
    }

    pub fn write_table(&self, table: &SeriesTable, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        self.write_to(table, BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file))?;
        debug!("Wrote {} rows to {}", table.len(), path.display());

        Ok(())
    }

    fn format_value(&self, value: Option<f64>) -> String {
        match (value, self.precision) {
            (Some(v), Some(p)) => format!("{:.*}", p, v),
            (Some(v), None) => v.to_string(),
            (None, _) => String::new(),
        }
    }
}

impl Default for SeriesWriter {
    fn default() -> Self {
        Self::new()
    }
}
