use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::archive::locator::ArchiveLocator;
use crate::error::{ProcessingError, Result};
use crate::models::field::{Field, MaskPolicy, FIELD_COUNT};
use crate::models::remark::Remark;
use crate::models::series::{SeriesRow, SeriesTable, Units};
use crate::processors::interpolation::{fill_time_gaps, forward_fill, hourly_grid, sample_at};
use crate::processors::stats::ReconstructionStats;
use crate::readers::ArchiveReader;

/// Below this wind speed the sampled direction is kept as is.
const CALM_EPSILON: f64 = 1e-9;

/// Per-cell flags marking values nulled by quality masking.
pub type GapMask = Vec<[bool; FIELD_COUNT]>;

/// The four views of a reconstructed window, all in physical units.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// Native timestamps, masked values left null.
    pub masked: SeriesTable,
    /// Native timestamps, archive values untouched.
    pub raw: SeriesTable,
    /// Native timestamps, masked values filled by time interpolation.
    pub interpolated: SeriesTable,
    /// Uniform hourly grid over the window.
    pub hourly: SeriesTable,
    pub stats: ReconstructionStats,
}

/// Loads yearly archives for one station and rebuilds a gap-filled hourly series.
#[derive(Debug, Clone)]
pub struct TimeSeriesReconstructor {
    archive_root: PathBuf,
    station: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    mask_policy: MaskPolicy,
    include_adjacent_years: bool,
    use_mmap: bool,
}

impl TimeSeriesReconstructor {
    pub fn new(
        archive_root: impl Into<PathBuf>,
        station: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self> {
        if start >= end {
            return Err(ProcessingError::InvalidInterval { start, end });
        }

        Ok(Self {
            archive_root: archive_root.into(),
            station: station.to_string(),
            start,
            end,
            mask_policy: MaskPolicy::default(),
            include_adjacent_years: true,
            use_mmap: false,
        })
    }

    pub fn with_mask_policy(mut self, mask_policy: MaskPolicy) -> Self {
        self.mask_policy = mask_policy;
        self
    }

    pub fn with_boundary_probe(mut self, include_adjacent_years: bool) -> Self {
        self.include_adjacent_years = include_adjacent_years;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    pub fn archive_root(&self) -> &Path {
        &self.archive_root
    }

    pub fn reconstruct(&self) -> Result<Reconstruction> {
        let mut stats = ReconstructionStats::new(&self.station, self.start, self.end);

        let plan = ArchiveLocator::new(&self.archive_root, &self.station).locate(
            self.start,
            self.end,
            self.include_adjacent_years,
        )?;
        stats.years_loaded = plan.years();
        stats.missing_boundary_years = plan.missing_boundary_years.clone();

        let reader = ArchiveReader::with_mmap(self.use_mmap);
        let mut records = Vec::new();
        for (year, path) in &plan.files {
            let contents = reader.read_archive(path)?;
            for row in &contents.corrupt_rows {
                stats.record_corrupt_row(format!("{} {}: {}", self.station, year, row));
            }
            records.extend(contents.records);
        }
        stats.rows_loaded = records.len();

        if records.is_empty() {
            return Err(ProcessingError::MissingData(format!(
                "no readable records for {} in {:?}",
                self.station,
                plan.years()
            )));
        }

        let masked = SeriesTable::from_records(&self.station, &records, Some(&self.mask_policy));
        let raw = SeriesTable::from_records(&self.station, &records, None);

        let gaps = find_quality_gaps(&masked, &raw, &self.mask_policy)?;
        let mut interpolated = overlay_gaps(&raw, &gaps);
        let filled = interpolate_gaps(&mut interpolated, &gaps);
        debug!("{}: filled {} masked cell(s)", self.station, filled);

        self.tally_gaps(&mut stats, &raw, &interpolated, &gaps);

        // wind components are derived per native sample, then resampled
        let interpolated = interpolated.to_physical();
        let hourly = resample_hourly(&interpolated, self.start, self.end);

        let masked = masked.clip(self.start, self.end);
        let raw = raw.clip(self.start, self.end);
        let interpolated = interpolated.clip(self.start, self.end);
        stats.native_rows = raw.len();
        stats.hourly_rows = hourly.len();

        for field in Field::ALL {
            let unresolved = stats.field(field).unresolved;
            if unresolved > 0 {
                warn!(
                    "{}: {} masked {} value(s) could not be interpolated",
                    self.station, unresolved, field
                );
            }
        }

        info!(
            "{}: reconstructed {} hourly rows from {} native rows ({} to {})",
            self.station, stats.hourly_rows, stats.native_rows, self.start, self.end
        );

        Ok(Reconstruction {
            masked: masked.to_physical(),
            raw: raw.to_physical(),
            interpolated,
            hourly,
            stats,
        })
    }

    fn tally_gaps(
        &self,
        stats: &mut ReconstructionStats,
        raw: &SeriesTable,
        interpolated: &SeriesTable,
        gaps: &GapMask,
    ) {
        for (i, row) in raw.rows.iter().enumerate() {
            if row.timestamp < self.start || row.timestamp > self.end {
                continue;
            }
            for field in Field::ALL {
                let counts = stats.field_mut(field);
                match row.remark(field) {
                    Some(Remark::Missing) => counts.missing += 1,
                    Some(Remark::Estimated) => counts.estimated += 1,
                    _ => {}
                }
                if gaps[i][field.index()] {
                    counts.masked += 1;
                    if interpolated.rows[i].value(field).is_some() {
                        counts.interpolated += 1;
                    } else {
                        counts.unresolved += 1;
                    }
                }
            }
        }
    }
}

/// Cells whose value is null in the masked table because of its remark,
/// as opposed to values that are simply absent from the archive.
pub fn find_quality_gaps(
    masked: &SeriesTable,
    raw: &SeriesTable,
    policy: &MaskPolicy,
) -> Result<GapMask> {
    if masked.len() != raw.len() {
        return Err(ProcessingError::InvalidFormat(format!(
            "masked table has {} rows, raw table has {}",
            masked.len(),
            raw.len()
        )));
    }

    Ok(masked
        .rows
        .iter()
        .zip(&raw.rows)
        .map(|(m, r)| {
            let mut gaps = [false; FIELD_COUNT];
            for field in Field::ALL {
                let masked_null = m.value(field).is_none();
                let became_null = masked_null && r.value(field).is_some();
                let quality_null =
                    masked_null && m.remark(field).map_or(false, |rk| policy.masks(field, rk));
                gaps[field.index()] = became_null || quality_null;
            }
            gaps
        })
        .collect())
}

/// Raw table with every gap cell nulled.
pub fn overlay_gaps(raw: &SeriesTable, gaps: &GapMask) -> SeriesTable {
    let mut table = raw.clone();
    for (row, row_gaps) in table.rows.iter_mut().zip(gaps) {
        for field in Field::ALL {
            if row_gaps[field.index()] {
                row.values[field.index()] = None;
            }
        }
    }
    table
}

/// Time-interpolates gap cells of every field; returns the number filled.
pub fn interpolate_gaps(table: &mut SeriesTable, gaps: &GapMask) -> usize {
    let times = table.timestamps();
    let mut filled = 0;

    for field in Field::ALL {
        let fill: Vec<bool> = gaps.iter().map(|g| g[field.index()]).collect();
        if !fill.iter().any(|f| *f) {
            continue;
        }
        let mut column = table.column(field);
        filled += fill_time_gaps(&times, &mut column, &fill);
        table.set_column(field, &column);
    }

    filled
}

/// Resamples onto an hourly grid: remarks and identity carry forward,
/// values are time-interpolated from the native samples.
///
/// Physical tables interpolate the wind components rather than the
/// direction, and the hourly direction is taken back from `(u, v)`.
pub fn resample_hourly(table: &SeriesTable, start: NaiveDateTime, end: NaiveDateTime) -> SeriesTable {
    let grid = hourly_grid(start, end);
    let times = table.timestamps();

    let mut rows: Vec<SeriesRow> = grid.iter().map(|t| SeriesRow::empty(*t)).collect();

    let codes: Vec<Option<String>> = table.rows.iter().map(|r| r.station_code.clone()).collect();
    let names: Vec<Option<String>> = table.rows.iter().map(|r| r.station_name.clone()).collect();
    for (row, code) in rows.iter_mut().zip(forward_fill(&times, &codes, &grid)) {
        row.station_code = code;
    }
    for (row, name) in rows.iter_mut().zip(forward_fill(&times, &names, &grid)) {
        row.station_name = name;
    }

    for field in Field::ALL {
        let remarks = forward_fill(&times, &table.remark_column(field), &grid);
        let values = sample_at(&times, &table.column(field), &grid);
        for ((row, remark), value) in rows.iter_mut().zip(remarks).zip(values) {
            row.remarks[field.index()] = remark;
            row.values[field.index()] = value;
        }
    }

    let u: Vec<Option<f64>> = table.rows.iter().map(|r| r.u).collect();
    let v: Vec<Option<f64>> = table.rows.iter().map(|r| r.v).collect();
    for ((row, u), v) in rows
        .iter_mut()
        .zip(sample_at(&times, &u, &grid))
        .zip(sample_at(&times, &v, &grid))
    {
        row.u = u;
        row.v = v;
        if table.units == Units::Physical {
            if let (Some(u), Some(v)) = (u, v) {
                if u.hypot(v) > CALM_EPSILON {
                    row.values[Field::WindDirection.index()] =
                        Some(v.atan2(u).to_degrees().rem_euclid(360.0));
                }
            }
        }
    }

    SeriesTable {
        station: table.station.clone(),
        units: table.units,
        rows,
    }
}
