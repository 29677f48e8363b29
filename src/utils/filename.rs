use std::path::{Path, PathBuf};

use crate::utils::constants::ARCHIVE_EXTENSION;

/// Yearly archive file name: `{station}{year}.csv`
pub fn archive_file_name(station: &str, year: i32) -> String {
    format!("{}{}.{}", station, year, ARCHIVE_EXTENSION)
}

/// Yearly archive path: `{root}/{station}/{station}{year}.csv`
pub fn archive_path(root: &Path, station: &str, year: i32) -> PathBuf {
    root.join(station).join(archive_file_name(station, year))
}

/// Year encoded in an archive file name for the given station, if any.
pub fn parse_archive_year(station: &str, file_name: &str) -> Option<i32> {
    let stem = file_name.strip_suffix(&format!(".{}", ARCHIVE_EXTENSION))?;
    let year = stem.strip_prefix(station)?;

    if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
        year.parse().ok()
    } else {
        None
    }
}

/// Default series output name: `{station}_{YYYYMMDDHH}_{YYYYMMDDHH}.csv`
pub fn series_file_name(
    station: &str,
    start: chrono::NaiveDateTime,
    end: chrono::NaiveDateTime,
) -> String {
    format!(
        "{}_{}_{}.csv",
        station,
        start.format("%Y%m%d%H"),
        end.format("%Y%m%d%H")
    )
}
