//! Error types shared across Hypescan crates.
//!
//! Terminal failures live in [`HypescanError`]. Per-record problems (a bad
//! chat line, a bad CSV row) are not errors of the operation: they are
//! collected as [`RecordError`] values and reported alongside the result.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level error type for Hypescan operations.
#[derive(Debug, thiserror::Error)]
pub enum HypescanError {
    #[error("Chat log contained no usable messages ({skipped} record(s) skipped)")]
    EmptyLog { skipped: usize },

    #[error("CSV contained no valid highlight rows ({skipped} row(s) skipped)")]
    EmptyImport { skipped: usize },

    #[error("Invalid interval: {field} must be a positive number of seconds (got {value})")]
    InvalidInterval { field: &'static str, value: f64 },

    #[error("Activity series spanning {span_secs}s needs more than {max_buckets} buckets; use a wider interval")]
    SeriesTooLong { span_secs: f64, max_buckets: usize },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Interchange error: {message}")]
    Interchange { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using HypescanError.
pub type HypescanResult<T> = Result<T, HypescanError>;

impl HypescanError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn interchange(msg: impl Into<String>) -> Self {
        Self::Interchange {
            message: msg.into(),
        }
    }

    pub fn invalid_interval(field: &'static str, value: f64) -> Self {
        Self::InvalidInterval { field, value }
    }

    /// Whether the failure came from configuration rather than input data.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidInterval { .. } | Self::Config { .. })
    }
}

/// Why a single record was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordErrorKind {
    /// A required field (timestamp, author, text) was absent.
    MissingField,
    /// The timestamp could not be parsed or was negative.
    BadTimestamp,
    /// The record was not structurally readable at all.
    Malformed,
}

impl fmt::Display for RecordErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingField => "missing field",
            Self::BadTimestamp => "bad timestamp",
            Self::Malformed => "malformed",
        };
        f.write_str(name)
    }
}

/// A recoverable, per-record parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordError {
    /// 1-based line (or record) number in the input.
    pub line: usize,
    pub kind: RecordErrorKind,
    pub reason: String,
}

impl RecordError {
    pub fn new(line: usize, kind: RecordErrorKind, reason: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            reason: reason.into(),
        }
    }

    pub fn missing_field(line: usize, field: &str) -> Self {
        Self::new(
            line,
            RecordErrorKind::MissingField,
            format!("missing required field `{field}`"),
        )
    }

    pub fn bad_timestamp(line: usize, raw: impl fmt::Display) -> Self {
        Self::new(
            line,
            RecordErrorKind::BadTimestamp,
            format!("unparsable timestamp `{raw}`"),
        )
    }

    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::new(line, RecordErrorKind::Malformed, reason)
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {}: {} ({})", self.line, self.reason, self.kind)
    }
}

/// How many individual record errors a summary keeps for display.
pub const RECORD_ERROR_SAMPLE_LIMIT: usize = 20;

/// Running tally of rejected records with a bounded sample of the errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordErrorSummary {
    /// Total number of rejected records.
    pub count: usize,
    /// The first few errors, in input order.
    pub sample: Vec<RecordError>,
}

impl RecordErrorSummary {
    pub fn record(&mut self, error: RecordError) {
        self.count += 1;
        if self.sample.len() < RECORD_ERROR_SAMPLE_LIMIT {
            self.sample.push(error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
