use chrono::NaiveDateTime;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid interval: start {start} is not before end {end}")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Archive for station {station}, year {year} not found in {}", .dir.display())]
    ArchiveNotFound {
        station: String,
        year: i32,
        dir: PathBuf,
    },

    #[error("No yearly archives for station {station} in {}", .dir.display())]
    NoArchives { station: String, dir: PathBuf },

    #[error("Station {0} not found")]
    StationNotFound(String),

    #[error("Invalid remark code: {0}")]
    InvalidRemark(u8),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Archive verification failed: {0}")]
    Verification(String),
}
