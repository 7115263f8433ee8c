//! Chat message types.
//!
//! A [`RawRecord`] is what a log format hands to the ingestor: every field
//! optional, timestamp not yet interpreted. A [`Message`] is the validated,
//! immutable form the activity builder consumes.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use hypescan_common::timecode;

/// Seconds elapsed since stream start.
pub type OffsetSecs = f64;

/// Timestamp as it appeared in the source log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Decimal seconds.
    Seconds(f64),
    /// Clock string such as `1:02:03` or a quoted decimal.
    Text(String),
}

impl RawTimestamp {
    /// Interpret as non-negative seconds since stream start.
    pub fn to_secs(&self) -> Option<OffsetSecs> {
        match self {
            Self::Seconds(secs) => (secs.is_finite() && *secs >= 0.0).then_some(*secs),
            Self::Text(raw) => timecode::parse_offset(raw),
        }
    }
}

impl fmt::Display for RawTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds(secs) => write!(f, "{secs}"),
            Self::Text(raw) => f.write_str(raw),
        }
    }
}

/// A normalized chat record produced by a log format reader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "t", default)]
    pub timestamp: Option<RawTimestamp>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub text: Option<String>,

    /// Emote identifiers the source already tagged (e.g. platform emoticon
    /// fragments). Text-embedded emotes are detected later.
    #[serde(default)]
    pub emotes: Vec<String>,
}

impl RawRecord {
    pub fn new(
        timestamp: RawTimestamp,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Some(timestamp),
            author: Some(author.into()),
            text: Some(text.into()),
            emotes: Vec::new(),
        }
    }

    pub fn with_emotes<I, S>(mut self, emotes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emotes = emotes.into_iter().map(Into::into).collect();
        self
    }
}

/// One chat event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Seconds since stream start.
    #[serde(rename = "t")]
    pub timestamp: OffsetSecs,

    pub author: String,

    pub text: String,

    /// Distinct emote identifiers found in the message.
    #[serde(default)]
    pub emotes: BTreeSet<String>,
}

impl Message {
    pub fn new(timestamp: OffsetSecs, author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            author: author.into(),
            text: text.into(),
            emotes: BTreeSet::new(),
        }
    }

    pub fn with_emotes<I, S>(mut self, emotes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emotes = emotes.into_iter().map(Into::into).collect();
        self
    }
}
