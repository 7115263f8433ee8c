//! Highlight events: detected peaks and valleys of chat activity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::activity::ActivityBucket;
use crate::message::OffsetSecs;

/// Whether a highlight marks a surge or a lull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    Peak,
    Valley,
}

impl HighlightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Peak => "peak",
            Self::Valley => "valley",
        }
    }

    /// Whether `candidate` is more extreme than `current` for this kind.
    /// Equal scores are not more extreme, so earlier detections win ties.
    pub fn is_more_extreme(&self, candidate: f64, current: f64) -> bool {
        match self {
            Self::Peak => candidate > current,
            Self::Valley => candidate < current,
        }
    }
}

impl fmt::Display for HighlightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown highlight kind `{0}`; expected `peak` or `valley`")]
pub struct UnknownHighlightKind(pub String);

impl FromStr for HighlightKind {
    type Err = UnknownHighlightKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "peak" => Ok(Self::Peak),
            "valley" => Ok(Self::Valley),
            _ => Err(UnknownHighlightKind(s.to_string())),
        }
    }
}

/// One detected moment of interest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    /// Start of the representative bucket.
    pub timestamp_secs: OffsetSecs,
    /// End of the last bucket folded into this highlight.
    pub end_secs: OffsetSecs,
    /// Weighted score of the representative bucket.
    pub score: f64,
    pub kind: HighlightKind,
}

impl Highlight {
    pub fn new(kind: HighlightKind, timestamp_secs: OffsetSecs, score: f64) -> Self {
        Self {
            timestamp_secs,
            end_secs: timestamp_secs,
            score,
            kind,
        }
    }

    /// A highlight spanning exactly one bucket.
    pub fn from_bucket(kind: HighlightKind, bucket: &ActivityBucket) -> Self {
        Self {
            timestamp_secs: bucket.start_secs,
            end_secs: bucket.end_secs,
            score: bucket.weighted_score,
            kind,
        }
    }

    pub fn with_end(mut self, end_secs: OffsetSecs) -> Self {
        self.end_secs = end_secs;
        self
    }

    pub fn is_peak(&self) -> bool {
        self.kind == HighlightKind::Peak
    }

    pub fn is_valley(&self) -> bool {
        self.kind == HighlightKind::Valley
    }
}
