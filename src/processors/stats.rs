use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::field::Field;
use crate::models::observation::ObservationRecord;
use crate::models::remark::Remark;

/// Cap on retained diagnostic messages; counters keep counting past it.
const MAX_MESSAGES: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCounts {
    pub normal: usize,
    pub estimated: usize,
    pub missing: usize,
    pub not_observed: usize,
    pub no_phenomenon: usize,
    pub explicit_zero: usize,
    pub parse_failures: usize,
}

/// Statistics for one source-to-archive conversion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub station: String,
    pub total_rows: usize,
    pub encoded_rows: usize,
    pub skipped_rows: usize,
    pub short_rows: usize,
    pub duplicate_rows: usize,
    pub cloud_observed: usize,
    pub cloud_interpolated: usize,
    pub fields: BTreeMap<Field, FieldCounts>,
    pub messages: Vec<String>,
}

impl ConversionStats {
    pub fn new(station: &str) -> Self {
        Self {
            station: station.to_string(),
            ..Default::default()
        }
    }

    /// Tallies remark outcomes of an encoded record.
    pub fn record(&mut self, record: &ObservationRecord) {
        self.encoded_rows += 1;
        for (field, measurement) in record.measurements() {
            let counts = self.fields.entry(field).or_default();
            match measurement.remark {
                Remark::Normal => counts.normal += 1,
                Remark::Estimated => counts.estimated += 1,
                Remark::Missing => counts.missing += 1,
                Remark::NotObserved => counts.not_observed += 1,
                Remark::NoPhenomenon => counts.no_phenomenon += 1,
                _ => {}
            }
            if field.accepts_explicit_zero(measurement.remark) && measurement.value == Some(0) {
                counts.explicit_zero += 1;
            }
        }
    }

    pub fn record_parse_failure(&mut self, field: Field, message: String) {
        self.fields.entry(field).or_default().parse_failures += 1;
        self.push_message(message);
    }

    pub fn record_skipped_row(&mut self, message: String) {
        self.skipped_rows += 1;
        self.push_message(message);
    }

    pub fn push_message(&mut self, message: String) {
        if self.messages.len() < MAX_MESSAGES {
            self.messages.push(message);
        }
    }

    pub fn field(&self, field: Field) -> FieldCounts {
        self.fields.get(&field).cloned().unwrap_or_default()
    }

    pub fn merge(&mut self, other: &ConversionStats) {
        self.total_rows += other.total_rows;
        self.encoded_rows += other.encoded_rows;
        self.skipped_rows += other.skipped_rows;
        self.short_rows += other.short_rows;
        self.duplicate_rows += other.duplicate_rows;
        self.cloud_observed += other.cloud_observed;
        self.cloud_interpolated += other.cloud_interpolated;
        for (field, counts) in &other.fields {
            let entry = self.fields.entry(*field).or_default();
            entry.normal += counts.normal;
            entry.estimated += counts.estimated;
            entry.missing += counts.missing;
            entry.not_observed += counts.not_observed;
            entry.no_phenomenon += counts.no_phenomenon;
            entry.explicit_zero += counts.explicit_zero;
            entry.parse_failures += counts.parse_failures;
        }
        for message in &other.messages {
            self.push_message(message.clone());
        }
    }
    /// Human-readable summary of the run.
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str(&format!("=== Conversion Report: {} ===\n", self.station));
        summary.push_str(&format!("Source Rows: {}\n", self.total_rows));
        summary.push_str(&format!("Encoded Rows: {}\n", self.encoded_rows));
        summary.push_str(&format!("Skipped Rows: {}\n", self.skipped_rows));
        summary.push_str(&format!("Short Rows: {}\n", self.short_rows));
        summary.push_str(&format!("Duplicate Hours: {}\n", self.duplicate_rows));
        summary.push_str(&format!(
            "Cloud Cover: {} observed, {} interpolated\n",
            self.cloud_observed, self.cloud_interpolated
        ));

        summary.push_str(&format!(
            "\n{:<16} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}\n",
            "Field", "normal", "est(5)", "miss(1)", "n/o(2)", "none(6)", "zero", "failed"
        ));
        for (field, c) in &self.fields {
            summary.push_str(&format!(
                "{:<16} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}\n",
                field.key(),
                c.normal,
                c.estimated,
                c.missing,
                c.not_observed,
                c.no_phenomenon,
                c.explicit_zero,
                c.parse_failures
            ));
        }

        if !self.messages.is_empty() {
            summary.push_str("\nFirst Problems:\n");
            for message in self.messages.iter().take(10) {
                summary.push_str(&format!("  {}\n", message));
            }
        }

        summary
    }
}

/// Gap accounting for one field over the requested window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapCounts {
    pub missing: usize,
    pub estimated: usize,
    /// Cells nulled by the mask policy.
    pub masked: usize,
    pub interpolated: usize,
    pub unresolved: usize,
}

/// Statistics for one time-series reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionStats {
    pub station: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub years_loaded: Vec<i32>,
    pub missing_boundary_years: Vec<i32>,
    pub rows_loaded: usize,
    pub native_rows: usize,
    pub hourly_rows: usize,
    pub corrupt_rows: usize,
    pub fields: BTreeMap<Field, GapCounts>,
    pub messages: Vec<String>,
}

impl ReconstructionStats {
    pub fn new(station: &str, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            station: station.to_string(),
            start,
            end,
            years_loaded: Vec::new(),
            missing_boundary_years: Vec::new(),
            rows_loaded: 0,
            native_rows: 0,
            hourly_rows: 0,
            corrupt_rows: 0,
            fields: BTreeMap::new(),
            messages: Vec::new(),
        }
    }

    pub fn record_corrupt_row(&mut self, message: String) {
        self.corrupt_rows += 1;
        if self.messages.len() < MAX_MESSAGES {
            self.messages.push(message);
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut GapCounts {
        self.fields.entry(field).or_default()
    }

    pub fn field(&self, field: Field) -> GapCounts {
        self.fields.get(&field).cloned().unwrap_or_default()
    }

    /// True when no degradation was recorded.
    pub fn is_clean(&self) -> bool {
        self.corrupt_rows == 0
            && self.missing_boundary_years.is_empty()
            && self.fields.values().all(|counts| counts.unresolved == 0)
    }
    /// Human-readable summary of the reconstruction.
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str(&format!("=== Reconstruction Report: {} ===\n", self.station));
        summary.push_str(&format!("Window: {} to {}\n", self.start, self.end));
        summary.push_str(&format!("Years Loaded: {:?}\n", self.years_loaded));
        if !self.missing_boundary_years.is_empty() {
            summary.push_str(&format!(
                "Missing Boundary Years: {:?}\n",
                self.missing_boundary_years
            ));
        }
        summary.push_str(&format!(
            "Rows: {} loaded, {} native in window, {} hourly\n",
            self.rows_loaded, self.native_rows, self.hourly_rows
        ));
        summary.push_str(&format!("Corrupt Rows: {}\n", self.corrupt_rows));

        let gaps: Vec<_> = self.fields.iter().filter(|(_, c)| c.masked > 0).collect();
        if !gaps.is_empty() {
            summary.push_str("\nMasked Values:\n");
            for (field, c) in gaps {
                summary.push_str(&format!(
                    "  {:<16} {} masked, {} interpolated, {} unresolved\n",
                    field.key(),
                    c.masked,
                    c.interpolated,
                    c.unresolved
                ));
            }
        }

        summary
    }
}
