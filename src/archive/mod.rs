pub mod layout;
pub mod locator;

pub use layout::{record_from_cells, record_to_cells, ARCHIVE_COLUMNS};
pub use locator::{archive_year, ArchiveLocator, ArchivePlan};
