//! Hypescan Interchange
//!
//! The CSV contract between highlight detection and editor marker importers:
//! - **Export:** highlights as the six-column highlight table or a bare
//!   list of marker seconds
//! - **Import:** read either layout back into highlights
//! - **Convert:** turn a column-based table into a marker list
//!
//! Column layout of the highlight table:
//!
//! | # | Column | Example |
//! |---|--------|---------|
//! | 1 | `Start Time (s)` | `100` |
//! | 2 | `End Time (s)` | `110` |
//! | 3 | `Kind` | `peak` |
//! | 4 | `Score` | `24` |
//! | 5 | `Start Time (hh:mm:ss)` | `0:01:40` |
//! | 6 | `End Time (hh:mm:ss)` | `0:01:50` |

pub mod convert;
pub mod export;
pub mod import;

pub use convert::{convert_file, convert_to_markers, ConvertStats};
pub use export::{export_to_file, highlights_to_string, write_highlights, CsvFormat, HIGHLIGHT_HEADER};
pub use import::{import_from_file, import_highlights, ImportStats};

/// Substring that marks a header row in column-based CSV files.
pub const HEADER_MARKER: &str = "Start Time";

/// Whether a CSV row is a header rather than data.
pub(crate) fn is_header_row(record: &csv::StringRecord) -> bool {
    record.iter().any(|field| field.contains(HEADER_MARKER))
}

/// 1-based line number of a record, falling back to its row index.
pub(crate) fn record_line(record: &csv::StringRecord, row: usize) -> usize {
    record
        .position()
        .map(|pos| pos.line() as usize)
        .unwrap_or(row + 1)
}
