use csv::ReaderBuilder;
use std::path::Path;
use tracing::{debug, warn};

use crate::archive::layout::record_from_cells;
use crate::error::Result;
use crate::models::observation::ObservationRecord;
use crate::readers::read_text;

/// A source or archive row that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptRow {
    pub line: usize,
    pub reason: String,
}

impl std::fmt::Display for CorruptRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArchiveContents {
    pub records: Vec<ObservationRecord>,
    pub corrupt_rows: Vec<CorruptRow>,
}

/// Reads headerless 33-column yearly archives.
pub struct ArchiveReader {
    use_mmap: bool,
}

impl ArchiveReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    /// Reads an archive; malformed rows are skipped and reported, I/O failures are fatal.
    pub fn read_archive(&self, path: &Path) -> Result<ArchiveContents> {
        let content = read_text(path, self.use_mmap)?;
        let contents = self.parse_content(&content);

        if !contents.corrupt_rows.is_empty() {
            warn!(
                "{}: skipped {} corrupt row(s)",
                path.display(),
                contents.corrupt_rows.len()
            );
        }
        debug!("{}: {} records", path.display(), contents.records.len());

        Ok(contents)
    }

    pub fn parse_content(&self, content: &str) -> ArchiveContents {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut contents = ArchiveContents::default();

        for (index, result) in reader.records().enumerate() {
            let line = result
                .as_ref()
                .ok()
                .and_then(|r| r.position())
                .map_or(index + 1, |p| p.line() as usize);

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    contents.corrupt_rows.push(CorruptRow {
                        line,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            let cells: Vec<&str> = row.iter().collect();
            match record_from_cells(&cells) {
                Ok(record) => contents.records.push(record),
                Err(e) => contents.corrupt_rows.push(CorruptRow {
                    line,
                    reason: e.to_string(),
                }),
            }
        }

        contents
    }
}

impl Default for ArchiveReader {
    fn default() -> Self {
        Self::new()
    }
}
