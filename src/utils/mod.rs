pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{archive_file_name, archive_path, parse_archive_year, series_file_name};
pub use progress::ProgressReporter;
