//! Activity buckets: chat intensity over fixed-width windows.

use serde::{Deserialize, Serialize};

use crate::message::OffsetSecs;

/// One fixed-width window of chat activity, covering `[start_secs, end_secs)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityBucket {
    pub start_secs: OffsetSecs,
    pub end_secs: OffsetSecs,
    /// Messages whose timestamp falls in the window.
    pub raw_count: usize,
    /// Sum of `1 + emote weights` over those messages.
    pub weighted_score: f64,
}

impl ActivityBucket {
    /// A bucket with no messages.
    pub fn empty(start_secs: OffsetSecs, width_secs: f64) -> Self {
        Self {
            start_secs,
            end_secs: start_secs + width_secs,
            raw_count: 0,
            weighted_score: 0.0,
        }
    }

    pub fn width_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    pub fn is_empty(&self) -> bool {
        self.raw_count == 0
    }
}
