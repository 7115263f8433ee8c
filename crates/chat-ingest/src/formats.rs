//! Chat log record sources.
//!
//! Each reader only splits the input into [`RawRecord`]s; validation of
//! timestamps and required fields happens in the [`Ingestor`](crate::Ingestor).

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use hypescan_chat_model::message::{RawRecord, RawTimestamp};
use hypescan_common::error::{HypescanError, HypescanResult, RecordError};

use crate::{LocatedRecord, RecordSource, SourceItem};

/// Supported chat log layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogFormat {
    /// Downloader dump: an array of comments or `{"comments": [...]}`.
    DownloaderJson,
    /// One JSON [`RawRecord`] per line.
    Jsonl,
    /// `[h:mm:ss] author: message` per line.
    Text,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DownloaderJson => "json",
            Self::Jsonl => "jsonl",
            Self::Text => "text",
        }
    }

    /// Guess the layout from the first bytes of a log.
    pub fn detect(head: &str) -> Self {
        let trimmed = head.trim_start_matches('\u{feff}').trim_start();

        if let Some(rest) = trimmed.strip_prefix('[') {
            // `[{...}]` or `[]` is a JSON array; `[0:01:02] ...` is text.
            return match rest.trim_start().chars().next() {
                Some('{') | Some(']') | None => Self::DownloaderJson,
                _ => Self::Text,
            };
        }

        if trimmed.starts_with('{') {
            let first_line = trimmed.lines().next().unwrap_or_default();
            return match serde_json::from_str::<serde_json::Value>(first_line) {
                Ok(value) if value.get("comments").is_some() => Self::DownloaderJson,
                Ok(_) => Self::Jsonl,
                // A pretty-printed object spans several lines.
                Err(_) => Self::DownloaderJson,
            };
        }

        Self::Text
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = HypescanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "downloader" => Ok(Self::DownloaderJson),
            "jsonl" | "ndjson" => Ok(Self::Jsonl),
            "text" | "txt" => Ok(Self::Text),
            other => Err(HypescanError::config(format!(
                "unknown log format `{other}`; use json, jsonl, or text"
            ))),
        }
    }
}

/// Open a chat log file, detecting its layout unless one is given.
///
/// The file handle is owned by the returned source and released when it
/// is dropped.
pub fn open_log(
    path: &Path,
    format: Option<LogFormat>,
) -> HypescanResult<Box<dyn RecordSource>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => HypescanError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => HypescanError::Io(e),
    })?;
    let mut reader = BufReader::new(file);

    let format = match format {
        Some(format) => format,
        None => LogFormat::detect(&String::from_utf8_lossy(reader.fill_buf()?)),
    };
    tracing::debug!(path = %path.display(), %format, "Opening chat log");

    source_from_reader(reader, format)
}

/// Build a record source over any buffered reader.
pub fn source_from_reader<R>(reader: R, format: LogFormat) -> HypescanResult<Box<dyn RecordSource>>
where
    R: BufRead + 'static,
{
    Ok(match format {
        LogFormat::DownloaderJson => Box::new(DownloaderJsonSource::from_reader(reader)?),
        LogFormat::Jsonl => Box::new(LineSource::new(reader, LineLayout::Jsonl)),
        LogFormat::Text => Box::new(LineSource::new(reader, LineLayout::Text)),
    })
}

// ---------------------------------------------------------------------------
// Downloader JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DownloaderComment {
    content_offset_seconds: Option<f64>,
    commenter: Option<DownloaderCommenter>,
    message: Option<DownloaderMessage>,
}

#[derive(Debug, Deserialize)]
struct DownloaderCommenter {
    display_name: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DownloaderMessage {
    body: Option<String>,
    #[serde(default)]
    fragments: Vec<DownloaderFragment>,
}

#[derive(Debug, Deserialize)]
struct DownloaderFragment {
    #[serde(default)]
    text: String,
    #[serde(default)]
    emoticon: Option<serde_json::Value>,
}

impl DownloaderComment {
    fn into_record(self) -> RawRecord {
        let author = self
            .commenter
            .and_then(|c| c.display_name.or(c.name));

        let (text, emotes) = match self.message {
            Some(message) => {
                let emotes = message
                    .fragments
                    .iter()
                    .filter(|f| f.emoticon.as_ref().is_some_and(|e| !e.is_null()))
                    .map(|f| f.text.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
                let text = message.body.or_else(|| {
                    (!message.fragments.is_empty()).then(|| {
                        message
                            .fragments
                            .iter()
                            .map(|f| f.text.as_str())
                            .collect::<String>()
                    })
                });
                (text, emotes)
            }
            None => (None, Vec::new()),
        };

        RawRecord {
            timestamp: self.content_offset_seconds.map(RawTimestamp::Seconds),
            author,
            text,
            emotes,
        }
    }
}

/// Reads a downloader chat dump. The document is parsed up front; each
/// comment is then validated individually.
pub struct DownloaderJsonSource {
    comments: std::iter::Enumerate<std::vec::IntoIter<serde_json::Value>>,
}

impl DownloaderJsonSource {
    pub fn from_reader<R: Read>(reader: R) -> HypescanResult<Self> {
        let document: serde_json::Value = serde_json::from_reader(reader)?;
        let comments = match document {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(mut map) => match map.remove("comments") {
                Some(serde_json::Value::Array(items)) => items,
                _ => {
                    return Err(HypescanError::Json(serde::de::Error::custom(
                        "chat log object has no `comments` array",
                    )))
                }
            },
            _ => {
                return Err(HypescanError::Json(serde::de::Error::custom(
                    "chat log must be a JSON array or an object with `comments`",
                )))
            }
        };
        Ok(Self {
            comments: comments.into_iter().enumerate(),
        })
    }
}

impl Iterator for DownloaderJsonSource {
    type Item = SourceItem;

    fn next(&mut self) -> Option<SourceItem> {
        let (index, value) = self.comments.next()?;
        let line = index + 1;
        Some(
            serde_json::from_value::<DownloaderComment>(value)
                .map(|comment| LocatedRecord {
                    line,
                    record: comment.into_record(),
                })
                .map_err(|e| RecordError::malformed(line, format!("bad comment: {e}"))),
        )
    }
}

impl RecordSource for DownloaderJsonSource {
    fn name(&self) -> &str {
        "downloader-json"
    }
}

// ---------------------------------------------------------------------------
// Line-oriented logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineLayout {
    Jsonl,
    Text,
}

/// Streams a line-per-record log. Blank lines and `#` comments are ignored.
pub struct LineSource<R> {
    reader: R,
    layout: LineLayout,
    line: usize,
    buf: Vec<u8>,
    finished: bool,
}

impl<R: BufRead> LineSource<R> {
    fn new(reader: R, layout: LineLayout) -> Self {
        Self {
            reader,
            layout,
            line: 0,
            buf: Vec::new(),
            finished: false,
        }
    }

    fn parse_line(&self, content: &str) -> SourceItem {
        let line = self.line;
        let record = match self.layout {
            LineLayout::Jsonl => serde_json::from_str::<RawRecord>(content)
                .map_err(|e| RecordError::malformed(line, format!("bad JSON record: {e}")))?,
            LineLayout::Text => parse_text_line(line, content)?,
        };
        Ok(LocatedRecord { line, record })
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = SourceItem;

    fn next(&mut self) -> Option<SourceItem> {
        while !self.finished {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    self.line += 1;
                    let content = match std::str::from_utf8(&self.buf) {
                        Ok(content) => content.trim(),
                        Err(_) => {
                            return Some(Err(RecordError::malformed(
                                self.line,
                                "line is not valid UTF-8",
                            )))
                        }
                    };
                    if content.is_empty() || content.starts_with('#') {
                        continue;
                    }
                    let content = content.to_string();
                    return Some(self.parse_line(&content));
                }
                Err(e) => {
                    // The rest of the log is unreadable; report once and stop.
                    self.finished = true;
                    tracing::warn!(line = self.line + 1, error = %e, "Chat log read failed");
                    return Some(Err(RecordError::malformed(
                        self.line + 1,
                        format!("read failed: {e}"),
                    )));
                }
            }
        }
        None
    }
}

impl<R: BufRead> RecordSource for LineSource<R> {
    fn name(&self) -> &str {
        match self.layout {
            LineLayout::Jsonl => "jsonl",
            LineLayout::Text => "text",
        }
    }
}

/// Parse `[timestamp] author: message`.
fn parse_text_line(line: usize, content: &str) -> Result<RawRecord, RecordError> {
    let rest = content
        .strip_prefix('[')
        .ok_or_else(|| RecordError::missing_field(line, "timestamp"))?;
    let (timestamp, rest) = rest
        .split_once(']')
        .ok_or_else(|| RecordError::malformed(line, "unterminated timestamp bracket"))?;
    let (author, text) = rest
        .split_once(':')
        .ok_or_else(|| RecordError::missing_field(line, "author"))?;

    Ok(RawRecord {
        timestamp: Some(RawTimestamp::Text(timestamp.trim().to_string())),
        author: Some(author.trim().to_string()),
        text: Some(text.trim().to_string()),
        emotes: Vec::new(),
    })
}
