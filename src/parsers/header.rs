//! Header row detection for logger exports with a metadata preamble.
//!
//! Data loggers often write a few `key,value` lines (device, channel setup,
//! start time) before the real column header. The header is the first raw
//! row that contains the [`HEADER_MARKER`] cell.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::types::LoadError;
use crate::state::HEADER_MARKER;

/// Build the raw (untyped, header-less) CSV reader shared by the scanner and the loader
pub(crate) fn raw_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

/// Decode a raw record lossily so non-UTF-8 logger output still loads
pub(crate) fn record_to_strings(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

/// Whether a raw row holds the header marker (cells compared after trimming)
pub fn is_header_row(cells: &[String]) -> bool {
    cells.iter().any(|cell| cell.trim() == HEADER_MARKER)
}

/// Scan up to `max_rows` raw rows from `reader` and return the zero-based
/// index of the first one containing the header marker.
///
/// `Ok(None)` means the file is assumed to start with a conventional header.
/// Blank lines are not counted as rows.
pub fn locate_header_in<R: Read>(reader: R, max_rows: usize) -> Result<Option<usize>, LoadError> {
    let mut csv_reader = raw_reader(reader);
    let mut record = csv::ByteRecord::new();
    let mut index = 0;

    while index < max_rows && csv_reader.read_byte_record(&mut record)? {
        if is_header_row(&record_to_strings(&record)) {
            return Ok(Some(index));
        }
        index += 1;
    }

    Ok(None)
}

/// Bounded header scan of a file on disk. The file handle is released
/// before returning on every path.
pub fn locate_header(path: &Path, max_rows: usize) -> Result<Option<usize>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let header = locate_header_in(BufReader::new(file), max_rows)?;

    tracing::debug!(
        "Header scan of {} ({} rows): {:?}",
        path.display(),
        max_rows,
        header
    );

    Ok(header)
}
