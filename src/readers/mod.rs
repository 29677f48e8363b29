pub mod archive_reader;
pub mod etrn_reader;
pub mod obsdl_reader;

pub use archive_reader::{ArchiveContents, ArchiveReader, CorruptRow};
pub use etrn_reader::EtrnReader;
pub use obsdl_reader::ObsdlReader;

use encoding_rs::SHIFT_JIS;
use memmap2::Mmap;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::models::signal::RawObservation;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;

/// Raw source rows plus the rows that could not be parsed.
#[derive(Debug, Clone, Default)]
pub struct SourceRows {
    pub observations: Vec<RawObservation>,
    pub skipped: Vec<CorruptRow>,
    /// Rows kept despite missing trailing columns.
    pub short_rows: usize,
}

/// Layout of a downloaded source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Numeric-quality CSV download.
    Obsdl,
    /// Hourly table with in-cell quality markers.
    Etrn,
}

impl SourceFormat {
    pub fn read_file(&self, path: &Path, use_mmap: bool) -> Result<SourceRows> {
        match self {
            SourceFormat::Obsdl => ObsdlReader::new().with_mmap(use_mmap).read_file(path),
            SourceFormat::Etrn => EtrnReader::with_mmap(use_mmap).read_file(path),
        }
    }
}

impl SourceRows {
    /// Appends another file's rows.
    pub fn extend(&mut self, other: SourceRows) {
        self.observations.extend(other.observations);
        self.skipped.extend(other.skipped);
        self.short_rows += other.short_rows;
    }
}

/// Reads a text file that may be UTF-8 (with or without BOM) or Shift_JIS.
pub fn read_text(path: &Path, use_mmap: bool) -> Result<String> {
    let file = File::open(path)?;

    if use_mmap {
        let mmap = unsafe { Mmap::map(&file)? };
        return Ok(decode_text(&mmap).into_owned());
    }

    let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(decode_text(&bytes).into_owned())
}

pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, _, had_errors) = SHIFT_JIS.decode(bytes);
            if had_errors {
                debug!("Shift_JIS decoding replaced malformed sequences");
            }
            text
        }
    }
}

/// Trimmed cell at `index`, `None` when absent.
pub(crate) fn cell<'a>(parts: &[&'a str], index: usize) -> Option<&'a str> {
    parts.get(index).map(|s| s.trim())
}
