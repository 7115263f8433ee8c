//! Highlight export.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use hypescan_chat_model::highlight::Highlight;
use hypescan_common::error::{HypescanError, HypescanResult};
use hypescan_common::timecode::format_clock;

/// Header row of the highlight table.
pub const HIGHLIGHT_HEADER: [&str; 6] = [
    "Start Time (s)",
    "End Time (s)",
    "Kind",
    "Score",
    "Start Time (hh:mm:ss)",
    "End Time (hh:mm:ss)",
];

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvFormat {
    /// Header plus one six-column row per highlight.
    #[default]
    Highlights,
    /// One start time in seconds per line, no header.
    Markers,
}

impl CsvFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Highlights => "highlights",
            Self::Markers => "markers",
        }
    }
}

impl fmt::Display for CsvFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CsvFormat {
    type Err = HypescanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "highlights" | "csv" => Ok(Self::Highlights),
            "markers" | "seconds" => Ok(Self::Markers),
            other => Err(HypescanError::config(format!(
                "unknown output format `{other}`; use highlights or markers"
            ))),
        }
    }
}

/// Write highlights in the chosen layout.
///
/// Seconds use the shortest decimal form that reads back to the same value.
pub fn write_highlights<W: Write>(
    writer: W,
    highlights: &[Highlight],
    format: CsvFormat,
) -> HypescanResult<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);

    match format {
        CsvFormat::Highlights => {
            csv.write_record(HIGHLIGHT_HEADER).map_err(csv_error)?;
            for highlight in highlights {
                csv.write_record([
                    highlight.timestamp_secs.to_string(),
                    highlight.end_secs.to_string(),
                    highlight.kind.to_string(),
                    highlight.score.to_string(),
                    format_clock(highlight.timestamp_secs),
                    format_clock(highlight.end_secs),
                ])
                .map_err(csv_error)?;
            }
        }
        CsvFormat::Markers => {
            for highlight in highlights {
                csv.write_record([highlight.timestamp_secs.to_string()])
                    .map_err(csv_error)?;
            }
        }
    }

    csv.flush()?;
    Ok(())
}

/// Render highlights to a string.
pub fn highlights_to_string(highlights: &[Highlight], format: CsvFormat) -> HypescanResult<String> {
    let mut buffer = Vec::new();
    write_highlights(&mut buffer, highlights, format)?;
    String::from_utf8(buffer).map_err(|e| HypescanError::interchange(e.to_string()))
}

/// Write highlights to `path`.
///
/// The whole document is rendered before the file is created, so a
/// failure never leaves a partial file behind.
pub fn export_to_file(path: &Path, highlights: &[Highlight], format: CsvFormat) -> HypescanResult<()> {
    let content = highlights_to_string(highlights, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;

    tracing::info!(
        path = %path.display(),
        %format,
        rows = highlights.len(),
        "Exported highlights"
    );
    Ok(())
}

pub(crate) fn csv_error(error: csv::Error) -> HypescanError {
    if error.is_io_error() {
        match error.into_kind() {
            csv::ErrorKind::Io(io) => HypescanError::Io(io),
            other => HypescanError::interchange(format!("{other:?}")),
        }
    } else {
        HypescanError::interchange(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypescan_chat_model::highlight::HighlightKind;

    fn sample() -> Vec<Highlight> {
        vec![
            Highlight::new(HighlightKind::Peak, 100.0, 24.0).with_end(110.0),
            Highlight::new(HighlightKind::Valley, 3725.5, 0.0).with_end(3760.0),
        ]
    }

    #[test]
    fn test_highlight_table_layout() {
        let csv = highlights_to_string(&sample(), CsvFormat::Highlights).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Start Time (s),End Time (s),Kind,Score,Start Time (hh:mm:ss),End Time (hh:mm:ss)",
                "100,110,peak,24,0:01:40,0:01:50",
                "3725.5,3760,valley,0,1:02:05,1:02:40",
            ]
        );
    }

    #[test]
    fn test_marker_layout() {
        let csv = highlights_to_string(&sample(), CsvFormat::Markers).unwrap();
        assert_eq!(csv, "100\n3725.5\n");
    }

    #[test]
    fn test_empty_highlights_still_write_header() {
        let csv = highlights_to_string(&[], CsvFormat::Highlights).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(highlights_to_string(&[], CsvFormat::Markers).unwrap().is_empty());
    }

    #[test]
    fn test_format_names() {
        assert_eq!("markers".parse::<CsvFormat>().unwrap(), CsvFormat::Markers);
        assert_eq!("Highlights".parse::<CsvFormat>().unwrap(), CsvFormat::Highlights);
        assert!("xlsx".parse::<CsvFormat>().unwrap_err().is_config_error());
    }

    #[test]
    fn test_export_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("highlights.csv");
        export_to_file(&path, &sample(), CsvFormat::Highlights).unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("Start Time (s)"));
    }
}
