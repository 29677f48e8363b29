use chrono::Datelike;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::models::observation::ObservationRecord;
use crate::models::signal::RawObservation;
use crate::models::station::StationMetadata;
use crate::processors::cloud_interpolator::CloudInterpolator;
use crate::processors::row_encoder::{FieldWarning, RowEncoder};
use crate::processors::stats::ConversionStats;
use crate::readers::SourceRows;

#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub records: Vec<ObservationRecord>,
    pub stats: ConversionStats,
    pub warnings: Vec<FieldWarning>,
}

impl ConversionOutput {
    /// Records grouped by the calendar year of their date, one group per yearly archive.
    pub fn by_year(&self) -> BTreeMap<i32, Vec<ObservationRecord>> {
        let mut years: BTreeMap<i32, Vec<ObservationRecord>> = BTreeMap::new();
        for record in &self.records {
            years
                .entry(record.date.year())
                .or_default()
                .push(record.clone());
        }
        years
    }
}

/// Turns raw source rows into a canonical per-station table:
/// order by time, drop duplicate hours, encode, then fill cloud cover.
pub struct GwoConverter {
    encoder: RowEncoder,
    interpolate_cloud: bool,
}

impl GwoConverter {
    pub fn new(station: StationMetadata) -> Self {
        Self {
            encoder: RowEncoder::new(station),
            interpolate_cloud: true,
        }
    }

    pub fn with_cloud_interpolation(mut self, interpolate_cloud: bool) -> Self {
        self.interpolate_cloud = interpolate_cloud;
        self
    }

    pub fn station(&self) -> &StationMetadata {
        self.encoder.station()
    }

    pub fn convert(&self, observations: &[RawObservation]) -> ConversionOutput {
        let station = self.encoder.station();
        let mut stats = ConversionStats::new(&station.name_en);
        stats.total_rows = observations.len();

        let mut ordered: Vec<&RawObservation> = observations.iter().collect();
        ordered.sort_by_key(|o| o.timestamp());

        let before = ordered.len();
        ordered.dedup_by_key(|o| o.timestamp());
        stats.duplicate_rows = before - ordered.len();
        if stats.duplicate_rows > 0 {
            debug!(
                "{}: dropped {} duplicate hour(s)",
                station.name_en, stats.duplicate_rows
            );
        }

        let mut records = Vec::with_capacity(ordered.len());
        let mut warnings = Vec::new();

        for observation in ordered {
            let encoded = self.encoder.encode(observation);
            for warning in &encoded.warnings {
                stats.record_parse_failure(warning.field, warning.to_string());
            }
            warnings.extend(encoded.warnings);
            records.push(encoded.record);
        }

        if self.interpolate_cloud {
            let summary = CloudInterpolator::new().interpolate(&mut records);
            stats.cloud_observed = summary.observed;
            stats.cloud_interpolated = summary.interpolated;
        }

        for record in &records {
            stats.record(record);
        }

        info!(
            "{}: encoded {} of {} rows ({} parse failure(s))",
            station.name_en,
            stats.encoded_rows,
            stats.total_rows,
            warnings.len()
        );

        ConversionOutput {
            records,
            stats,
            warnings,
        }
    }

    /// Converts rows from a source reader, carrying its skipped rows into the statistics.
    pub fn convert_rows(&self, rows: &SourceRows) -> ConversionOutput {
        let mut output = self.convert(&rows.observations);
        output.stats.total_rows += rows.skipped.len();
        output.stats.short_rows = rows.short_rows;
        for skipped in &rows.skipped {
            output.stats.record_skipped_row(skipped.to_string());
        }
        output
    }
}
