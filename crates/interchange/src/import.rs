//! Highlight import.
//!
//! Accepts both export layouts. A single-column row is a bare marker and
//! becomes a zero-score peak. In wider rows only the start time is
//! required: an absent or unreadable kind becomes `peak`, score becomes 0
//! and end time becomes the start. Rows without a readable start time are
//! skipped and counted.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use hypescan_chat_model::highlight::{Highlight, HighlightKind};
use hypescan_common::error::{HypescanError, HypescanResult, RecordError, RecordErrorSummary};
use hypescan_common::timecode::parse_clock;

use crate::{is_header_row, record_line};

/// Counters for one import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportStats {
    /// Data rows read, excluding the header.
    pub rows_seen: usize,
    pub imported: usize,
    /// Imported rows where kind, score or end time had to be filled in.
    pub defaulted: usize,
    pub errors: RecordErrorSummary,
}

impl ImportStats {
    pub fn skipped(&self) -> usize {
        self.errors.count
    }
}

/// Parse highlights from CSV text.
///
/// Fails with `EmptyImport` when no row yields a highlight.
pub fn import_highlights<R: Read>(reader: R) -> HypescanResult<(Vec<Highlight>, ImportStats)> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut highlights = Vec::new();
    let mut stats = ImportStats::default();

    for (row, result) in csv.records().enumerate() {
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
        match parse_row(&record, record_line(&record, row)) {
            Ok((highlight, defaulted)) => {
                stats.defaulted += usize::from(defaulted);
                highlights.push(highlight);
            }
            Err(error) => {
                tracing::debug!(%error, "Skipping CSV row");
                stats.errors.record(error);
            }
        }
    }

    stats.imported = highlights.len();
    if stats.defaulted > 0 {
        tracing::warn!(
            rows = stats.defaulted,
            "Imported CSV rows with default values"
        );
    }
    if highlights.is_empty() {
        return Err(HypescanError::EmptyImport {
            skipped: stats.skipped(),
        });
    }
    Ok((highlights, stats))
}

/// Parse highlights from a CSV file.
pub fn import_from_file(path: &Path) -> HypescanResult<(Vec<Highlight>, ImportStats)> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => HypescanError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => HypescanError::Io(e),
    })?;
    let (highlights, stats) = import_highlights(std::io::BufReader::new(file))?;

    tracing::info!(
        path = %path.display(),
        imported = stats.imported,
        skipped = stats.skipped(),
        "Imported highlights"
    );
    Ok((highlights, stats))
}

/// Parse one data row. The flag is set when any field beyond the start
/// time was missing or unreadable.
fn parse_row(record: &csv::StringRecord, line: usize) -> Result<(Highlight, bool), RecordError> {
    let field = |index: usize| record.get(index).filter(|f| !f.is_empty());

    let start_raw = field(0).ok_or_else(|| RecordError::missing_field(line, "start time"))?;
    let start = parse_seconds(start_raw).ok_or_else(|| RecordError::bad_timestamp(line, start_raw))?;

    if record.len() == 1 {
        return Ok((Highlight::new(HighlightKind::Peak, start, 0.0), false));
    }

    let end = field(1).and_then(parse_seconds);
    let kind = field(2).and_then(|raw| raw.parse::<HighlightKind>().ok());
    let score = field(3)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|s| s.is_finite());

    let defaulted = end.is_none() || kind.is_none() || score.is_none();
    if defaulted {
        tracing::debug!(line, "Filling in unreadable CSV columns");
    }

    let highlight = Highlight::new(
        kind.unwrap_or(HighlightKind::Peak),
        start,
        score.unwrap_or(0.0),
    )
    .with_end(end.unwrap_or(start));
    Ok((highlight, defaulted))
}

/// Decimal seconds (sign allowed) or a clock string.
fn parse_seconds(raw: &str) -> Option<f64> {
    if raw.contains(':') {
        return parse_clock(raw);
    }
    raw.parse::<f64>().ok().filter(|secs| secs.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypescan_common::error::RecordErrorKind;

    #[test]
    fn test_imports_highlight_table() {
        let csv = "\
Start Time (s),End Time (s),Kind,Score,Start Time (hh:mm:ss),End Time (hh:mm:ss)
100,110,peak,24,0:01:40,0:01:50
3725.5,3760,valley,0,1:02:05,1:02:40
";
        let (highlights, stats) = import_highlights(csv.as_bytes()).unwrap();
        assert_eq!(stats.rows_seen, 2);
        assert_eq!(stats.imported, 2);
        assert_eq!(
            highlights[0],
            Highlight::new(HighlightKind::Peak, 100.0, 24.0).with_end(110.0)
        );
        assert_eq!(highlights[1].kind, HighlightKind::Valley);
        assert_eq!(highlights[1].timestamp_secs, 3725.5);
    }

    #[test]
    fn test_imports_marker_lines() {
        let (highlights, _) = import_highlights("12\n\n0:01:00\n 90.5 \n".as_bytes()).unwrap();
        let times: Vec<f64> = highlights.iter().map(|h| h.timestamp_secs).collect();
        assert_eq!(times, vec![12.0, 60.0, 90.5]);
        assert!(highlights.iter().all(|h| h.is_peak() && h.score == 0.0));
    }

    #[test]
    fn test_only_bad_start_times_skip_rows() {
        let csv = "\
Start Time (s),End Time (s),Kind,Score
10,20,peak,30
soon,20,peak,30
30,40,surge,5
50,60,valley,
,70,peak,1
";
        let (highlights, stats) = import_highlights(csv.as_bytes()).unwrap();
        assert_eq!(stats.rows_seen, 5);
        assert_eq!(stats.imported, 3);
        assert_eq!(stats.defaulted, 2);
        assert_eq!(stats.skipped(), 2);
        assert_eq!(stats.errors.sample[0].kind, RecordErrorKind::BadTimestamp);
        assert_eq!(stats.errors.sample[0].line, 3);
        assert_eq!(stats.errors.sample[1].kind, RecordErrorKind::MissingField);

        assert_eq!(
            highlights[1],
            Highlight::new(HighlightKind::Peak, 30.0, 5.0).with_end(40.0)
        );
        assert_eq!(
            highlights[2],
            Highlight::new(HighlightKind::Valley, 50.0, 0.0).with_end(60.0)
        );
    }

    #[test]
    fn test_rate_columns_and_short_rows_keep_their_start_time() {
        let csv = "\
Start Time (s),End Time (s),Rate Type,Rate Value,Start Time (hh:mm:ss),End Time (hh:mm:ss)
95.0,125.0,Pogs,18.5,0:01:35,0:02:05
10,20
";
        let (highlights, stats) = import_highlights(csv.as_bytes()).unwrap();
        assert_eq!(stats.skipped(), 0);
        assert_eq!(stats.defaulted, 2);
        assert_eq!(
            highlights,
            vec![
                Highlight::new(HighlightKind::Peak, 95.0, 18.5).with_end(125.0),
                Highlight::new(HighlightKind::Peak, 10.0, 0.0).with_end(20.0),
            ]
        );
    }

    #[test]
    fn test_header_only_is_empty_import() {
        let err = import_highlights("Start Time (s),Kind\n".as_bytes()).unwrap_err();
        assert!(matches!(err, HypescanError::EmptyImport { skipped: 0 }));
    }

    #[test]
    fn test_all_invalid_is_empty_import() {
        let err = import_highlights("abc\nxyz\n".as_bytes()).unwrap_err();
        assert!(matches!(err, HypescanError::EmptyImport { skipped: 2 }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = import_from_file(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, HypescanError::FileNotFound { .. }));
    }
}
