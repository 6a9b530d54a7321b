pub mod current_log;
pub mod header;
pub mod types;

pub use current_log::{load_log_csv, CurrentLogParser};
pub use header::{locate_header, locate_header_in};
pub use types::{LoadError, LogTable, Parseable, Row, RowId, Value};
