//! Current log CSV loader
//!
//! Loads CSV exports from DC current data loggers. The header row may sit
//! below a metadata preamble; it is located with [`locate_header`] and the
//! header names are normalized into the canonical schema.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::header::{locate_header, locate_header_in, raw_reader, record_to_strings};
use super::types::{LoadError, LogTable, Parseable};
use crate::normalize::{normalize_columns, ColumnAliases};
use crate::state::DEFAULT_HEADER_SCAN_DEPTH;

/// Current log parser for in-memory data
#[derive(Clone, Debug)]
pub struct CurrentLogParser {
    /// Raw rows scanned for the header marker
    pub scan_depth: usize,
    pub aliases: ColumnAliases,
}

impl Default for CurrentLogParser {
    fn default() -> Self {
        Self {
            scan_depth: DEFAULT_HEADER_SCAN_DEPTH,
            aliases: ColumnAliases::builtin(),
        }
    }
}

impl Parseable for CurrentLogParser {
    fn parse(&self, data: &str) -> Result<LogTable, LoadError> {
        let header_row = locate_header_in(data.as_bytes(), self.scan_depth)?;
        let table = read_table(data.as_bytes(), header_row)?
            .ok_or_else(|| LoadError::Empty("<memory>".into()))?;
        Ok(normalize_columns(table, &self.aliases)?)
    }
}

/// Load a current log from disk.
///
/// Fails with [`LoadError::NotFound`] when the path does not exist. When no
/// header marker is found within `scan_depth` rows, the first row is used
/// as the header.
pub fn load_log_csv(
    path: &Path,
    aliases: &ColumnAliases,
    scan_depth: usize,
) -> Result<LogTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let header_row = locate_header(path, scan_depth)?;
    match header_row {
        Some(row) => tracing::info!("Header marker found on row {}", row),
        None => tracing::info!(
            "No header marker in the first {} rows, using the first row as header",
            scan_depth
        ),
    }

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_table(BufReader::new(file), header_row)?
        .ok_or_else(|| LoadError::Empty(path.to_path_buf()))?;

    tracing::info!(
        "Loaded {}: {} columns, {} rows",
        path.display(),
        table.columns.len(),
        table.len()
    );

    Ok(normalize_columns(table, aliases)?)
}

/// Read a whole CSV, using raw row `header_row` (or the first row) as header.
///
/// Rows above the header are discarded. Returns `Ok(None)` when the input
/// has no header row at all.
fn read_table<R: Read>(reader: R, header_row: Option<usize>) -> Result<Option<LogTable>, LoadError> {
    let header_row = header_row.unwrap_or(0);
    let mut csv_reader = raw_reader(reader);
    let mut record = csv::ByteRecord::new();

    let mut index = 0;
    let mut header: Option<Vec<String>> = None;
    let mut records: Vec<Vec<String>> = Vec::new();

    while csv_reader.read_byte_record(&mut record)? {
        if index == header_row {
            header = Some(record_to_strings(&record));
        } else if index > header_row {
            records.push(record_to_strings(&record));
        }
        index += 1;
    }

    Ok(header.map(|names| LogTable::from_records(header_names(names), records)))
}

/// Header cells to unique column names: empty cells become `Unnamed: <i>`
/// and repeated names get `.1`, `.2`, ... suffixes.
fn header_names(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names: Vec<String> = Vec::with_capacity(raw.len());

    for (i, cell) in raw.into_iter().enumerate() {
        let base = if cell.trim().is_empty() {
            format!("Unnamed: {}", i)
        } else {
            cell
        };

        let mut name = base.clone();
        while let Some(count) = seen.get_mut(&name) {
            *count += 1;
            name = format!("{}.{}", base, count);
        }
        seen.insert(name.clone(), 0);
        names.push(name);
    }

    names
}
