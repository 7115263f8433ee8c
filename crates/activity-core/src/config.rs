//! Detection configuration.

use serde::{Deserialize, Serialize};

use hypescan_chat_model::emote::EmoteWeightTable;
use hypescan_common::error::{HypescanError, HypescanResult};

use crate::report::AnalysisWarning;

/// Configuration for one highlight detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Width of each activity bucket in seconds.
    pub interval_width_secs: f64,

    /// Minimum weighted score for a bucket to count as a peak.
    pub peak_threshold: f64,

    /// Maximum weighted score for a bucket to count as a valley.
    pub valley_threshold: f64,

    /// Same-kind highlights closer than this are merged (seconds).
    pub min_separation_secs: f64,

    /// Emote multipliers used when scoring messages.
    pub emote_weights: EmoteWeightTable,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            interval_width_secs: 10.0,
            peak_threshold: 20.0,
            valley_threshold: 0.0,
            min_separation_secs: 30.0,
            emote_weights: EmoteWeightTable::hype_defaults(),
        }
    }
}

impl DetectionConfig {
    /// Reject unusable settings and report suspicious ones.
    ///
    /// Inverted thresholds are allowed: overlapping buckets classify as
    /// peaks, and a warning is returned so the caller can surface it.
    pub fn validate(&self) -> HypescanResult<Vec<AnalysisWarning>> {
        if !(self.interval_width_secs.is_finite() && self.interval_width_secs > 0.0) {
            return Err(HypescanError::invalid_interval(
                "interval_width_secs",
                self.interval_width_secs,
            ));
        }
        if !(self.min_separation_secs.is_finite() && self.min_separation_secs > 0.0) {
            return Err(HypescanError::invalid_interval(
                "min_separation_secs",
                self.min_separation_secs,
            ));
        }
        if !self.peak_threshold.is_finite() {
            return Err(HypescanError::config(format!(
                "peak_threshold must be finite (got {})",
                self.peak_threshold
            )));
        }
        if !self.valley_threshold.is_finite() {
            return Err(HypescanError::config(format!(
                "valley_threshold must be finite (got {})",
                self.valley_threshold
            )));
        }

        let mut warnings = Vec::new();
        if self.peak_threshold < self.valley_threshold {
            tracing::warn!(
                peak = self.peak_threshold,
                valley = self.valley_threshold,
                "Peak threshold is below valley threshold; overlapping buckets become peaks"
            );
            warnings.push(AnalysisWarning::ThresholdConflict {
                peak_threshold: self.peak_threshold,
                valley_threshold: self.valley_threshold,
            });
        }
        Ok(warnings)
    }
}
