use chrono::{Datelike, Duration, NaiveDateTime};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ProcessingError, Result};
use crate::utils::filename::{archive_file_name, parse_archive_year};

/// Yearly archive files selected for a reconstruction window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePlan {
    pub station: String,
    pub first_year: i32,
    pub last_year: i32,
    /// (year, path) in ascending year order.
    pub files: Vec<(i32, PathBuf)>,
    pub missing_boundary_years: Vec<i32>,
}

impl ArchivePlan {
    pub fn years(&self) -> Vec<i32> {
        self.files.iter().map(|(year, _)| *year).collect()
    }

    pub fn has_leading_anchor(&self) -> bool {
        self.files.first().map_or(false, |(y, _)| *y < self.first_year)
    }

    pub fn has_trailing_anchor(&self) -> bool {
        self.files.last().map_or(false, |(y, _)| *y > self.last_year)
    }
}

/// Finds `{station}{year}.csv` archives under `{root}/{station}/`.
#[derive(Debug, Clone)]
pub struct ArchiveLocator {
    station: String,
    station_dir: PathBuf,
}

impl ArchiveLocator {
    pub fn new(archive_root: &Path, station: &str) -> Self {
        Self {
            station: station.to_string(),
            station_dir: archive_root.join(station),
        }
    }

    pub fn station_dir(&self) -> &Path {
        &self.station_dir
    }

    /// Years with an archive file present.
    pub fn available_years(&self) -> Result<BTreeSet<i32>> {
        let entries = match std::fs::read_dir(&self.station_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e.into()),
        };

        let mut years = BTreeSet::new();
        for entry in entries {
            let entry = entry?;
            if let Some(year) = entry
                .file_name()
                .to_str()
                .and_then(|name| parse_archive_year(&self.station, name))
            {
                years.insert(year);
            }
        }

        Ok(years)
    }

    /// Selects archives covering `[start, end]`, optionally one year either side.
    pub fn locate(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        include_adjacent_years: bool,
    ) -> Result<ArchivePlan> {
        let available = self.available_years()?;
        if available.is_empty() {
            return Err(ProcessingError::NoArchives {
                station: self.station.clone(),
                dir: self.station_dir.clone(),
            });
        }

        let first_year = archive_year(start);
        let last_year = archive_year(end);

        let mut files = Vec::new();
        let mut missing_boundary_years = Vec::new();

        if include_adjacent_years {
            self.push_boundary(first_year - 1, &available, &mut files, &mut missing_boundary_years);
        }

        for year in first_year..=last_year {
            if !available.contains(&year) {
                return Err(ProcessingError::ArchiveNotFound {
                    station: self.station.clone(),
                    year,
                    dir: self.station_dir.clone(),
                });
            }
            files.push((year, self.path_for(year)));
        }

        if include_adjacent_years {
            self.push_boundary(last_year + 1, &available, &mut files, &mut missing_boundary_years);
        }

        debug!(
            "Located {} archive(s) for {} covering {}..={}",
            files.len(),
            self.station,
            first_year,
            last_year
        );

        Ok(ArchivePlan {
            station: self.station.clone(),
            first_year,
            last_year,
            files,
            missing_boundary_years,
        })
    }

    fn push_boundary(
        &self,
        year: i32,
        available: &BTreeSet<i32>,
        files: &mut Vec<(i32, PathBuf)>,
        missing: &mut Vec<i32>,
    ) {
        if available.contains(&year) {
            files.push((year, self.path_for(year)));
        } else {
            warn!(
                "No {} archive for boundary year {}; interpolation at that edge has no anchor",
                self.station, year
            );
            missing.push(year);
        }
    }

    fn path_for(&self, year: i32) -> PathBuf {
        self.station_dir.join(archive_file_name(&self.station, year))
    }
}

/// Year of the archive file holding the record stamped at `t`.
/// Midnight on 1 January is hour 24 of the previous year's last day.
pub fn archive_year(t: NaiveDateTime) -> i32 {
    (t - Duration::seconds(1)).year()
}
