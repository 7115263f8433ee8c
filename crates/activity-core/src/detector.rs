//! Peak and valley detection over an activity series.
//!
//! # Algorithm
//!
//! 1. **Classify** each bucket: peak if `score >= peak_threshold`, else
//!    valley if `score <= valley_threshold`. Peak wins when thresholds overlap.
//! 2. **Reduce** each run of consecutive same-class buckets to one highlight
//!    at its most extreme bucket (earliest on ties).
//! 3. **Merge** same-kind highlights closer than `min_separation_secs`,
//!    keeping the more extreme one, until no such pair remains.
//! 4. **Order** peaks and valleys together by timestamp.
//!
//! A highlight's timestamp is the *start* of its representative bucket.

use serde::{Deserialize, Serialize};

use hypescan_chat_model::activity::ActivityBucket;
use hypescan_chat_model::highlight::{Highlight, HighlightKind};
use hypescan_common::error::{HypescanError, HypescanResult};

use crate::config::DetectionConfig;

/// Counters describing how a detection pass arrived at its result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionSummary {
    /// Buckets at or above the peak threshold.
    pub peak_buckets: usize,
    /// Buckets at or below the valley threshold (and not peaks).
    pub valley_buckets: usize,
    /// Runs of consecutive qualifying buckets before merging.
    pub runs: usize,
    /// Highlights absorbed by the minimum-separation merge.
    pub merged: usize,
}

/// The highlight detector.
#[derive(Debug, Clone)]
pub struct HighlightDetector {
    peak_threshold: f64,
    valley_threshold: f64,
    min_separation_secs: f64,
}

impl HighlightDetector {
    /// Create a detector from explicit thresholds.
    pub fn new(
        peak_threshold: f64,
        valley_threshold: f64,
        min_separation_secs: f64,
    ) -> HypescanResult<Self> {
        if !(min_separation_secs.is_finite() && min_separation_secs > 0.0) {
            return Err(HypescanError::invalid_interval(
                "min_separation_secs",
                min_separation_secs,
            ));
        }
        Ok(Self {
            peak_threshold,
            valley_threshold,
            min_separation_secs,
        })
    }

    /// Create a detector from a run configuration.
    pub fn from_config(config: &DetectionConfig) -> HypescanResult<Self> {
        Self::new(
            config.peak_threshold,
            config.valley_threshold,
            config.min_separation_secs,
        )
    }

    /// Classify a single bucket.
    pub fn classify(&self, bucket: &ActivityBucket) -> Option<HighlightKind> {
        if bucket.weighted_score >= self.peak_threshold {
            Some(HighlightKind::Peak)
        } else if bucket.weighted_score <= self.valley_threshold {
            Some(HighlightKind::Valley)
        } else {
            None
        }
    }

    /// Detect highlights in a gap-free bucket series.
    pub fn detect(&self, buckets: &[ActivityBucket]) -> Vec<Highlight> {
        let (highlights, _) = self.detect_with_summary(buckets);
        highlights
    }

    /// Detect highlights and return the pass counters alongside.
    pub fn detect_with_summary(
        &self,
        buckets: &[ActivityBucket],
    ) -> (Vec<Highlight>, DetectionSummary) {
        let mut summary = DetectionSummary::default();
        let candidates = self.reduce_runs(buckets, &mut summary);
        summary.runs = candidates.len();

        let (peaks, valleys): (Vec<Highlight>, Vec<Highlight>) =
            candidates.into_iter().partition(Highlight::is_peak);

        let mut highlights = self.merge_close(peaks);
        highlights.extend(self.merge_close(valleys));
        highlights.sort_by(|a, b| a.timestamp_secs.total_cmp(&b.timestamp_secs));
        summary.merged = summary.runs - highlights.len();

        tracing::debug!(
            peaks = summary.peak_buckets,
            valleys = summary.valley_buckets,
            runs = summary.runs,
            merged = summary.merged,
            highlights = highlights.len(),
            "Highlight detection complete"
        );

        (highlights, summary)
    }

    /// Collapse runs of consecutive same-class buckets into one highlight each.
    fn reduce_runs(
        &self,
        buckets: &[ActivityBucket],
        summary: &mut DetectionSummary,
    ) -> Vec<Highlight> {
        let mut reduced = vec![];
        let mut current: Option<Highlight> = None;

        for bucket in buckets {
            let class = self.classify(bucket);
            match class {
                Some(HighlightKind::Peak) => summary.peak_buckets += 1,
                Some(HighlightKind::Valley) => summary.valley_buckets += 1,
                None => {}
            }

            match (&mut current, class) {
                (Some(run), Some(kind)) if run.kind == kind => {
                    run.end_secs = bucket.end_secs;
                    if kind.is_more_extreme(bucket.weighted_score, run.score) {
                        run.timestamp_secs = bucket.start_secs;
                        run.score = bucket.weighted_score;
                    }
                }
                _ => {
                    if let Some(run) = current.take() {
                        reduced.push(run);
                    }
                    current = class.map(|kind| Highlight::from_bucket(kind, bucket));
                }
            }
        }

        if let Some(run) = current {
            reduced.push(run);
        }

        reduced
    }

    /// Merge same-kind highlights closer than the minimum separation.
    ///
    /// `highlights` must all share one kind and be ordered by timestamp.
    fn merge_close(&self, mut highlights: Vec<Highlight>) -> Vec<Highlight> {
        // Keep merging until no pair violates the separation.
        loop {
            let mut merged_any = false;
            let mut result: Vec<Highlight> = Vec::with_capacity(highlights.len());

            for next in highlights {
                match result.last_mut() {
                    Some(last)
                        if next.timestamp_secs - last.timestamp_secs
                            < self.min_separation_secs =>
                    {
                        let end_secs = last.end_secs.max(next.end_secs);
                        if next.kind.is_more_extreme(next.score, last.score) {
                            *last = next;
                        }
                        last.end_secs = end_secs;
                        merged_any = true;
                    }
                    _ => result.push(next),
                }
            }

            highlights = result;
            if !merged_any {
                break;
            }
        }

        highlights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(width: f64, scores: &[f64]) -> Vec<ActivityBucket> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| ActivityBucket {
                start_secs: i as f64 * width,
                end_secs: (i + 1) as f64 * width,
                raw_count: score as usize,
                weighted_score: score,
            })
            .collect()
    }

    #[test]
    fn test_no_qualifying_buckets_yields_nothing() {
        let detector = HighlightDetector::new(100.0, -1.0, 30.0).unwrap();
        let (highlights, summary) =
            detector.detect_with_summary(&series(10.0, &[5.0, 6.0, 7.0]));
        assert!(highlights.is_empty());
        assert_eq!(summary, DetectionSummary::default());
    }

    #[test]
    fn test_threshold_boundaries_are_inclusive() {
        let detector = HighlightDetector::new(20.0, 2.0, 5.0).unwrap();
        let buckets = series(10.0, &[20.0, 2.0, 10.0]);
        assert_eq!(detector.classify(&buckets[0]), Some(HighlightKind::Peak));
        assert_eq!(detector.classify(&buckets[1]), Some(HighlightKind::Valley));
        assert_eq!(detector.classify(&buckets[2]), None);
    }

    #[test]
    fn test_equal_thresholds_prefer_peak() {
        let detector = HighlightDetector::new(5.0, 5.0, 5.0).unwrap();
        let buckets = series(10.0, &[5.0]);
        assert_eq!(detector.classify(&buckets[0]), Some(HighlightKind::Peak));
    }

    #[test]
    fn test_inverted_thresholds_prefer_peak() {
        let detector = HighlightDetector::new(3.0, 8.0, 5.0).unwrap();
        let buckets = series(10.0, &[1.0, 5.0, 9.0]);
        assert_eq!(detector.classify(&buckets[0]), Some(HighlightKind::Valley));
        assert_eq!(detector.classify(&buckets[1]), Some(HighlightKind::Peak));
        assert_eq!(detector.classify(&buckets[2]), Some(HighlightKind::Peak));
    }

    #[test]
    fn test_run_reduces_to_maximum_with_earliest_tie() {
        let detector = HighlightDetector::new(10.0, -1.0, 1.0).unwrap();
        let highlights = detector.detect(&series(10.0, &[0.0, 12.0, 30.0, 15.0, 30.0, 0.0]));
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].timestamp_secs, 20.0);
        assert_eq!(highlights[0].score, 30.0);
        assert_eq!(highlights[0].end_secs, 50.0);
    }

    #[test]
    fn test_valley_run_reduces_to_minimum() {
        let detector = HighlightDetector::new(100.0, 3.0, 1.0).unwrap();
        let highlights = detector.detect(&series(10.0, &[9.0, 3.0, 1.0, 2.0, 9.0]));
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].kind, HighlightKind::Valley);
        assert_eq!(highlights[0].timestamp_secs, 20.0);
        assert_eq!(highlights[0].score, 1.0);
    }

    #[test]
    fn test_close_runs_merge_keeping_extreme() {
        // Peak runs at 10s (score 25) and 30s (score 40), separated by one quiet bucket.
        let detector = HighlightDetector::new(20.0, -1.0, 30.0).unwrap();
        let (highlights, summary) =
            detector.detect_with_summary(&series(10.0, &[0.0, 25.0, 5.0, 40.0, 5.0]));
        assert_eq!(summary.runs, 2);
        assert_eq!(summary.merged, 1);
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].timestamp_secs, 30.0);
        assert_eq!(highlights[0].score, 40.0);
        assert_eq!(highlights[0].end_secs, 40.0);
    }

    #[test]
    fn test_merge_tie_keeps_earlier() {
        let detector = HighlightDetector::new(20.0, -1.0, 30.0).unwrap();
        let highlights = detector.detect(&series(10.0, &[25.0, 5.0, 25.0]));
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].timestamp_secs, 0.0);
    }

    #[test]
    fn test_distant_runs_stay_separate() {
        let detector = HighlightDetector::new(20.0, -1.0, 30.0).unwrap();
        let highlights = detector.detect(&series(10.0, &[25.0, 5.0, 5.0, 25.0]));
        let times: Vec<f64> = highlights.iter().map(|h| h.timestamp_secs).collect();
        assert_eq!(times, vec![0.0, 30.0]);
    }

    #[test]
    fn test_merge_repeats_until_stable() {
        // Chained peaks 20s apart collapse onto the strongest one.
        let detector = HighlightDetector::new(20.0, -1.0, 25.0).unwrap();
        let highlights = detector.detect(&series(10.0, &[21.0, 0.0, 22.0, 0.0, 23.0]));
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].timestamp_secs, 40.0);
        assert_eq!(highlights[0].score, 23.0);
    }

    #[test]
    fn test_peaks_and_valleys_interleave_by_time() {
        let detector = HighlightDetector::new(20.0, 0.0, 15.0).unwrap();
        let highlights = detector.detect(&series(10.0, &[5.0, 30.0, 5.0, 0.0, 5.0, 40.0]));
        let kinds: Vec<HighlightKind> = highlights.iter().map(|h| h.kind).collect();
        assert_eq!(
            kinds,
            vec![HighlightKind::Peak, HighlightKind::Valley, HighlightKind::Peak]
        );
        assert!(highlights
            .windows(2)
            .all(|w| w[0].timestamp_secs < w[1].timestamp_secs));
    }

    #[test]
    fn test_rejects_non_positive_separation() {
        assert!(HighlightDetector::new(1.0, 0.0, 0.0).is_err());
        assert!(HighlightDetector::new(1.0, 0.0, -3.0).is_err());
    }
}
