pub mod archive_writer;
pub mod series_writer;

pub use archive_writer::ArchiveWriter;
pub use series_writer::SeriesWriter;
