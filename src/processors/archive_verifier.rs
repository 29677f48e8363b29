use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::archive::layout::{record_to_cells, remark_column, value_column, ARCHIVE_COLUMNS};
use crate::error::Result;
use crate::models::field::Field;
use crate::models::observation::ObservationRecord;
use crate::readers::ArchiveReader;
use crate::utils::constants::{CLOUD_OBSERVATION_HOURS, SIGNIFICANT_DIFF_PERCENT, SOLAR_TOLERANCE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffStatus {
    Minor,
    Significant,
    /// Weather codes are not published by the sources, so they always differ.
    Expected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDiff {
    pub column: usize,
    pub name: String,
    pub count: usize,
    pub percent: f64,
    pub status: DiffStatus,
}

/// A non-observation hour where the reference stores cloud 0 with remark 2
/// instead of an interpolated value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudDefectSample {
    pub row: usize,
    pub date: chrono::NaiveDate,
    pub hour: u32,
    pub converted: Option<i32>,
    pub reference: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub converted_rows: usize,
    pub reference_rows: usize,
    pub columns: Vec<ColumnDiff>,
    /// Reference rows showing the uninterpolated-cloud defect.
    pub cloud_defect_rows: usize,
    /// Non-observation hours whose cloud value differs.
    pub cloud_diff_rows: usize,
    pub cloud_samples: Vec<CloudDefectSample>,
}

impl VerificationReport {
    pub fn row_counts_match(&self) -> bool {
        self.converted_rows == self.reference_rows
    }

    pub fn has_cloud_defect(&self) -> bool {
        self.cloud_defect_rows > 0
    }

    /// Significant differences outside cloud and weather columns.
    pub fn unexpected_differences(&self) -> Vec<&ColumnDiff> {
        let cloud = value_column(Field::CloudCover);
        self.columns
            .iter()
            .filter(|c| c.status == DiffStatus::Significant && c.column != cloud)
            .collect()
    }

    pub fn core_data_matches(&self) -> bool {
        self.unexpected_differences().is_empty()
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Archive Verification ===\n");
        summary.push_str(&format!(
            "Rows: converted={}, reference={}\n",
            self.converted_rows, self.reference_rows
        ));
        if !self.row_counts_match() {
            summary.push_str("WARNING: row counts differ\n");
        }

        summary.push_str("\nColumns with differences:\n");
        for diff in &self.columns {
            let status = match diff.status {
                DiffStatus::Minor => "minor",
                DiffStatus::Significant => "SIGNIFICANT",
                DiffStatus::Expected => "expected (no weather codes in source)",
            };
            summary.push_str(&format!(
                "  Col {:2} ({:<20}): {:5} diffs ({:5.2}%) - {}\n",
                diff.column, diff.name, diff.count, diff.percent, status
            ));
        }
        summary.push_str(&format!(
            "Total columns with differences: {}/{}\n",
            self.columns.len(),
            ARCHIVE_COLUMNS.len()
        ));

        if self.has_cloud_defect() {
            summary.push_str(&format!(
                "\nReference archive stores cloud 0/remark 2 at non-observation hours ({} rows); \
                 {} rows differ from the interpolated values\n",
                self.cloud_defect_rows, self.cloud_diff_rows
            ));
            for s in &self.cloud_samples {
                summary.push_str(&format!(
                    "  Row {:5} ({} {:02}:00): converted={:?}, reference={:?}\n",
                    s.row, s.date, s.hour, s.converted, s.reference
                ));
            }
        } else {
            summary.push_str("\nNo cloud interpolation defect in reference\n");
        }

        summary.push('\n');
        for diff in self.unexpected_differences() {
            summary.push_str(&format!(
                "Unexpected difference in {}: {} rows ({:.2}%)\n",
                diff.name, diff.count, diff.percent
            ));
        }
        if self.core_data_matches() {
            summary.push_str("Core data matches\n");
        }

        summary
    }
}

/// Compares a converted yearly archive against a legacy reference archive.
pub struct ArchiveVerifier {
    reader: ArchiveReader,
    sample_limit: usize,
}

impl ArchiveVerifier {
    pub fn new() -> Self {
        Self {
            reader: ArchiveReader::new(),
            sample_limit: 3,
        }
    }

    pub fn verify_files(&self, converted: &Path, reference: &Path) -> Result<VerificationReport> {
        let converted_contents = self.reader.read_archive(converted)?;
        let reference_contents = self.reader.read_archive(reference)?;

        let report = self.verify(&converted_contents.records, &reference_contents.records);
        if report.core_data_matches() {
            info!("{}: core data matches {}", converted.display(), reference.display());
        } else {
            warn!(
                "{}: {} column(s) differ significantly from {}",
                converted.display(),
                report.unexpected_differences().len(),
                reference.display()
            );
        }
        Ok(report)
    }

    /// Rows are compared by position.
    pub fn verify(&self, converted: &[ObservationRecord], reference: &[ObservationRecord]) -> VerificationReport {
        let rows: Vec<(Vec<String>, Vec<String>)> = converted
            .iter()
            .zip(reference)
            .map(|(c, r)| (record_to_cells(c), record_to_cells(r)))
            .collect();

        let solar = value_column(Field::Solar);
        let weather = [value_column(Field::Weather), remark_column(Field::Weather)];
        let total = converted.len().max(1);

        let mut columns = Vec::new();
        for (column, name) in ARCHIVE_COLUMNS.iter().enumerate() {
            let count = rows
                .iter()
                .filter(|(c, r)| {
                    if column == solar {
                        differs_beyond(&c[column], &r[column], SOLAR_TOLERANCE)
                    } else {
                        c[column] != r[column]
                    }
                })
                .count();
            if count == 0 {
                continue;
            }

            let percent = count as f64 * 100.0 / total as f64;
            let status = if weather.contains(&column) {
                DiffStatus::Expected
            } else if percent > SIGNIFICANT_DIFF_PERCENT {
                DiffStatus::Significant
            } else {
                DiffStatus::Minor
            };

            columns.push(ColumnDiff {
                column,
                name: name.to_string(),
                count,
                percent,
                status,
            });
        }

        let mut cloud_defect_rows = 0;
        let mut cloud_diff_rows = 0;
        let mut cloud_samples = Vec::new();
        for (row, (c, r)) in converted.iter().zip(reference).enumerate() {
            if CLOUD_OBSERVATION_HOURS.contains(&c.hour) {
                continue;
            }
            let (cv, rv) = (c.value(Field::CloudCover), r.value(Field::CloudCover));
            if rv == Some(0) && r.remark(Field::CloudCover).as_u8() == 2 {
                cloud_defect_rows += 1;
            }
            if cv != rv {
                cloud_diff_rows += 1;
                if cloud_samples.len() < self.sample_limit {
                    cloud_samples.push(CloudDefectSample {
                        row: row + 1,
                        date: c.date,
                        hour: c.hour,
                        converted: cv,
                        reference: rv,
                    });
                }
            }
        }

        VerificationReport {
            converted_rows: converted.len(),
            reference_rows: reference.len(),
            columns,
            cloud_defect_rows,
            cloud_diff_rows,
            cloud_samples,
        }
    }
}

impl Default for ArchiveVerifier {
    fn default() -> Self {
        Self::new()
    }
}

fn differs_beyond(a: &str, b: &str, tolerance: i64) -> bool {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => (a - b).abs() > tolerance,
        _ => a != b,
    }
}
