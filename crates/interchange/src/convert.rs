//! Column-based CSV to marker list conversion.
//!
//! Reads the `hh:mm:ss` start time from the fifth column of each row and
//! writes it back as whole seconds, one per line. This is the format the
//! plain-seconds marker importers consume.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use hypescan_common::error::{HypescanError, HypescanResult, RecordError, RecordErrorSummary};
use hypescan_common::timecode::parse_clock;

use crate::export::csv_error;
use crate::{is_header_row, record_line};

/// Zero-based index of the clock-time column.
pub const CLOCK_COLUMN: usize = 4;

/// Counters for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertStats {
    pub rows_seen: usize,
    pub converted: usize,
    pub errors: RecordErrorSummary,
}

/// Convert column-based CSV into a marker list.
///
/// Rows without a readable clock time in the fifth column are skipped.
pub fn convert_to_markers<R: Read, W: Write>(reader: R, writer: W) -> HypescanResult<ConvertStats> {
    let mut input = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut output = csv::WriterBuilder::new().from_writer(writer);
    let mut stats = ConvertStats::default();

    for (row, result) in input.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(row + 1);
                stats.rows_seen += 1;
                stats.errors.record(RecordError::malformed(line, e.to_string()));
                continue;
            }
        };
        if row == 0 && is_header_row(&record) {
            continue;
        }
        stats.rows_seen += 1;

        let line = record_line(&record, row);
        let Some(raw) = record.get(CLOCK_COLUMN) else {
            stats
                .errors
                .record(RecordError::missing_field(line, "start time (hh:mm:ss)"));
            continue;
        };
        let Some(secs) = parse_clock(raw) else {
            stats.errors.record(RecordError::bad_timestamp(line, raw));
            continue;
        };

        output
            .write_record([(secs.floor() as u64).to_string()])
            .map_err(csv_error)?;
        stats.converted += 1;
    }

    output.flush()?;
    if stats.errors.count > 0 {
        tracing::warn!(skipped = stats.errors.count, "Skipped unconvertible CSV rows");
    }
    Ok(stats)
}

/// Convert `input` into a marker file at `output`.
pub fn convert_file(input: &Path, output: &Path) -> HypescanResult<ConvertStats> {
    let reader = std::fs::File::open(input).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => HypescanError::FileNotFound {
            path: input.to_path_buf(),
        },
        _ => HypescanError::Io(e),
    })?;

    let mut rendered = Vec::new();
    let stats = convert_to_markers(std::io::BufReader::new(reader), &mut rendered)?;
    std::fs::write(output, rendered)?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        converted = stats.converted,
        "Converted highlights to markers"
    );
    Ok(stats)
}
