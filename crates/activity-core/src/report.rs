//! Run results and non-fatal diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

use hypescan_chat_model::activity::ActivityBucket;
use hypescan_chat_model::highlight::Highlight;
use hypescan_ingest::IngestStats;

use crate::detector::DetectionSummary;
use crate::series::SeriesStats;

/// Something the caller should know about that did not stop the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// `peak_threshold < valley_threshold`; overlapping buckets became peaks.
    ThresholdConflict {
        peak_threshold: f64,
        valley_threshold: f64,
    },
    /// Messages arrived with timestamps earlier than ones already seen.
    OutOfOrderTimestamps { count: usize },
    /// Records that could not be parsed and were skipped.
    SkippedRecords { count: usize },
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThresholdConflict {
                peak_threshold,
                valley_threshold,
            } => write!(
                f,
                "peak threshold {peak_threshold} is below valley threshold {valley_threshold}; \
                 buckets matching both were classified as peaks"
            ),
            Self::OutOfOrderTimestamps { count } => {
                write!(f, "{count} message(s) had out-of-order timestamps")
            }
            Self::SkippedRecords { count } => {
                write!(f, "{count} malformed record(s) were skipped")
            }
        }
    }
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Detected highlights ordered by timestamp.
    pub highlights: Vec<Highlight>,
    /// The gap-free activity series the highlights were detected on.
    pub buckets: Vec<ActivityBucket>,
    pub ingest: IngestStats,
    pub detection: DetectionSummary,
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisReport {
    pub fn peaks(&self) -> impl Iterator<Item = &Highlight> {
        self.highlights.iter().filter(|h| h.is_peak())
    }

    pub fn valleys(&self) -> impl Iterator<Item = &Highlight> {
        self.highlights.iter().filter(|h| h.is_valley())
    }

    pub fn series_stats(&self) -> SeriesStats {
        SeriesStats::from_buckets(&self.buckets)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
