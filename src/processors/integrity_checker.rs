use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::field::Field;
use crate::models::observation::ObservationRecord;
use crate::models::remark::Remark;

/// Outcome of auditing a set of canonical records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    pub duplicate_timestamps: usize,
    pub out_of_order: usize,
    pub violations: Vec<RemarkViolation>,
    /// Remark histogram per field.
    pub remark_counts: BTreeMap<Field, BTreeMap<Remark, usize>>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.duplicate_timestamps == 0 && self.out_of_order == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemarkViolation {
    pub station_code: String,
    pub timestamp: NaiveDateTime,
    pub field: Option<Field>,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Remark says the value is absent but a value is stored.
    ValueWithAbsentRemark,
    /// Remark 6 with anything but zero.
    NonZeroNoPhenomenon,
    DuplicateTimestamp,
    OutOfOrder,
}

/// Audits canonical records against the remark/value rules of the archive format.
pub struct IntegrityChecker {
    max_violations: usize,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            max_violations: 1000,
        }
    }

    pub fn with_max_violations(max_violations: usize) -> Self {
        Self { max_violations }
    }

    /// Records are checked in the order given; each station's timestamps must increase.
    pub fn check(&self, records: &[ObservationRecord]) -> IntegrityReport {
        let mut report = IntegrityReport {
            total_records: records.len(),
            ..Default::default()
        };

        let mut last_seen: BTreeMap<&str, NaiveDateTime> = BTreeMap::new();

        for record in records {
            let mut bad_record = false;
            let timestamp = record.timestamp();

            for (field, measurement) in record.measurements() {
                *report
                    .remark_counts
                    .entry(field)
                    .or_default()
                    .entry(measurement.remark)
                    .or_default() += 1;

                if let Some((violation_type, details)) = check_measurement(field, measurement.value, measurement.remark) {
                    bad_record = true;
                    self.push(
                        &mut report,
                        RemarkViolation {
                            station_code: record.station_code.clone(),
                            timestamp,
                            field: Some(field),
                            violation_type,
                            details,
                        },
                    );
                }
            }

            if let Some(previous) = last_seen.insert(record.station_code.as_str(), timestamp) {
                let ordering = if timestamp == previous {
                    report.duplicate_timestamps += 1;
                    Some(ViolationType::DuplicateTimestamp)
                } else if timestamp < previous {
                    report.out_of_order += 1;
                    Some(ViolationType::OutOfOrder)
                } else {
                    None
                };

                if let Some(violation_type) = ordering {
                    bad_record = true;
                    self.push(
                        &mut report,
                        RemarkViolation {
                            station_code: record.station_code.clone(),
                            timestamp,
                            field: None,
                            violation_type,
                            details: format!("follows {}", previous),
                        },
                    );
                }
            }

            if bad_record {
                report.invalid_records += 1;
            } else {
                report.valid_records += 1;
            }
        }

        report
    }

    fn push(&self, report: &mut IntegrityReport, violation: RemarkViolation) {
        if report.violations.len() < self.max_violations {
            report.violations.push(violation);
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();
        let percent = |n: usize| {
            if report.total_records == 0 {
                0.0
            } else {
                100.0 * n as f64 / report.total_records as f64
            }
        };

        summary.push_str("=== Integrity Check Report ===\n");
        summary.push_str(&format!("Total Records: {}\n", report.total_records));
        summary.push_str(&format!(
            "Valid Records: {} ({:.1}%)\n",
            report.valid_records,
            percent(report.valid_records)
        ));
        summary.push_str(&format!(
            "Invalid Records: {} ({:.1}%)\n",
            report.invalid_records,
            percent(report.invalid_records)
        ));
        summary.push_str(&format!("Duplicate Timestamps: {}\n", report.duplicate_timestamps));
        summary.push_str(&format!("Out of Order: {}\n", report.out_of_order));

        summary.push_str("\nRemarks per Field:\n");
        for (field, counts) in &report.remark_counts {
            let cells: Vec<String> = counts
                .iter()
                .map(|(remark, n)| format!("{}={}", remark.as_u8(), n))
                .collect();
            summary.push_str(&format!("  {:<16} {}\n", field.key(), cells.join(" ")));
        }

        summary.push_str(&format!("\nViolations: {}\n", report.violations.len()));
        if !report.violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.violations.iter().take(10).enumerate() {
                let field = violation.field.map_or("-", |f| f.key());
                summary.push_str(&format!(
                    "  {}. Station {} at {} [{}]: {}\n",
                    i + 1,
                    violation.station_code,
                    violation.timestamp,
                    field,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn check_measurement(field: Field, value: Option<i32>, remark: Remark) -> Option<(ViolationType, String)> {
    match remark {
        // interpolated cloud hours carry a value under remark 1 or 2
        Remark::Missing | Remark::NotObserved if field == Field::CloudCover => None,
        Remark::Missing | Remark::NotObserved
            if value.is_some() && !(field.accepts_explicit_zero(remark) && value == Some(0)) =>
        {
            Some((
                ViolationType::ValueWithAbsentRemark,
                format!("value {:?} stored with remark {}", value, remark.as_u8()),
            ))
        }
        Remark::NoPhenomenon if value != Some(0) => Some((
            ViolationType::NonZeroNoPhenomenon,
            format!("value {:?} stored with remark 6", value),
        )),
        _ => None,
    }
}
