use csv::{Terminator, WriterBuilder};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::archive::layout::record_to_cells;
use crate::error::Result;
use crate::models::observation::ObservationRecord;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use crate::utils::filename::archive_path;

/// Writes canonical records as headerless 33-column archive rows.
pub struct ArchiveWriter {
    terminator: Terminator,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            terminator: Terminator::Any(b'\n'),
        }
    }

    /// CRLF line endings, as some legacy archive tools expect.
    pub fn with_crlf(mut self, crlf: bool) -> Self {
        self.terminator = if crlf {
            Terminator::CRLF
        } else {
            Terminator::Any(b'\n')
        };
        self
    }

    pub fn write_to<W: Write>(&self, records: &[ObservationRecord], writer: W) -> Result<()> {
        let mut csv = WriterBuilder::new()
            .has_headers(false)
            .terminator(self.terminator)
            .from_writer(writer);

        for record in records {
            csv.write_record(record_to_cells(record))?;
        }
        csv.flush()?;

        Ok(())
    }

    /// Write records to an archive file, creating parent directories
    pub fn write_records(&self, records: &[ObservationRecord], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        self.write_to(records, BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file))?;
        debug!("Wrote {} records to {}", records.len(), path.display());

        Ok(())
    }

    /// Writes one year to `root/station/stationYEAR.csv` and returns the path.
    pub fn write_year(
        &self,
        root: &Path,
        station: &str,
        year: i32,
        records: &[ObservationRecord],
    ) -> Result<PathBuf> {
        let path = archive_path(root, station, year);
        self.write_records(records, &path)?;
        Ok(path)
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::field::Field;
    use crate::models::observation::Measurement;
    use crate::models::remark::Remark;
    use crate::models::station::StationMetadata;
    use crate::readers::ArchiveReader;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn records() -> Vec<ObservationRecord> {
        let station =
            StationMetadata::new("662".to_string(), "東京".to_string(), "Tokyo".to_string());
        let date = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        (23..=24)
            .map(|hour| {
                let mut record = ObservationRecord::new(&station, date, hour);
                record.set(Field::Temperature, Measurement::new(Some(-15), Remark::Normal));
                record.set(Field::Precipitation, Measurement::new(Some(0), Remark::NoPhenomenon));
                record
            })
            .collect()
    }

    #[test]
    fn test_write_to_buffer() {
        let mut buffer = Vec::new();
        ArchiveWriter::new().write_to(&records(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("662,東京,662,2020,12,31,23,,2,,2,-15,8,"));
        assert!(lines[1].ends_with(",0,6"));
        assert_eq!(lines[0].split(',').count(), 33);
        assert!(!text.contains('\r'));
    }

    #[test]
    fn test_write_year_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = ArchiveWriter::new()
            .write_year(dir.path(), "Tokyo", 2020, &records())
            .unwrap();

        assert_eq!(path, dir.path().join("Tokyo").join("Tokyo2020.csv"));

        let contents = ArchiveReader::new().read_archive(&path).unwrap();
        assert!(contents.corrupt_rows.is_empty());
        assert_eq!(contents.records, records());
    }
}
