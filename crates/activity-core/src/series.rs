//! Activity series construction.
//!
//! # Algorithm
//!
//! 1. **Anchor** the grid at the first message's timestamp.
//! 2. **Index** each message as `floor((t - anchor) / width)`.
//! 3. **Accumulate** message count and weighted score per index.
//! 4. **Materialize** every index from the lowest to the highest observed,
//!    filling unobserved indices with empty buckets.
//!
//! Memory is bounded by the number of buckets, not messages, and the
//! bucket count is capped at [`MAX_BUCKETS`].
//! A message that arrives earlier than the anchor (an out-of-order log)
//! lands on a negative index and extends the grid backwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hypescan_chat_model::activity::ActivityBucket;
use hypescan_chat_model::emote::EmoteWeightTable;
use hypescan_chat_model::message::{Message, OffsetSecs};
use hypescan_common::error::{HypescanError, HypescanResult};

/// Largest series the builder will materialize. At the default 10 s
/// width this covers more than 200 days.
pub const MAX_BUCKETS: usize = 2_000_000;

#[derive(Debug, Clone, Copy, Default)]
struct Cell {
    raw_count: usize,
    weighted_score: f64,
}

/// Single-pass bucket accumulator.
pub struct ActivitySeriesBuilder<'a> {
    width_secs: f64,
    emotes: &'a EmoteWeightTable,
    anchor_secs: Option<OffsetSecs>,
    cells: BTreeMap<i64, Cell>,
    messages: usize,
}

impl<'a> ActivitySeriesBuilder<'a> {
    /// Fails with `InvalidInterval` unless `width_secs` is positive.
    pub fn new(width_secs: f64, emotes: &'a EmoteWeightTable) -> HypescanResult<Self> {
        if !(width_secs.is_finite() && width_secs > 0.0) {
            return Err(HypescanError::invalid_interval(
                "interval_width_secs",
                width_secs,
            ));
        }
        Ok(Self {
            width_secs,
            emotes,
            anchor_secs: None,
            cells: BTreeMap::new(),
            messages: 0,
        })
    }

    /// Add one message to its bucket.
    ///
    /// Fails with `SeriesTooLong` when the message lies [`MAX_BUCKETS`] or
    /// more buckets away from the anchor.
    pub fn push(&mut self, message: &Message) -> HypescanResult<()> {
        let anchor = *self.anchor_secs.get_or_insert(message.timestamp);
        let offset = ((message.timestamp - anchor) / self.width_secs).floor();
        if !(offset.abs() < MAX_BUCKETS as f64) {
            return Err(series_too_long((message.timestamp - anchor).abs()));
        }
        let index = offset as i64;

        let cell = self.cells.entry(index).or_default();
        cell.raw_count += 1;
        cell.weighted_score += self.emotes.message_weight(&message.emotes);
        self.messages += 1;
        Ok(())
    }

    /// Number of messages pushed so far.
    pub fn message_count(&self) -> usize {
        self.messages
    }

    /// Produce the gap-free bucket sequence. Empty if nothing was pushed.
    ///
    /// Fails with `SeriesTooLong` when the span from the earliest to the
    /// latest bucket exceeds [`MAX_BUCKETS`].
    pub fn finish(self) -> HypescanResult<Vec<ActivityBucket>> {
        let (Some(anchor), Some((&first, _)), Some((&last, _))) = (
            self.anchor_secs,
            self.cells.first_key_value(),
            self.cells.last_key_value(),
        ) else {
            return Ok(Vec::new());
        };

        let width = self.width_secs;
        let span = (last - first + 1) as usize;
        if span > MAX_BUCKETS {
            return Err(series_too_long(span as f64 * width));
        }
        let start_of = |index: i64| anchor + index as f64 * width;

        let buckets: Vec<ActivityBucket> = (first..=last)
            .map(|index| {
                let cell = self.cells.get(&index).copied().unwrap_or_default();
                ActivityBucket {
                    start_secs: start_of(index),
                    end_secs: start_of(index + 1),
                    raw_count: cell.raw_count,
                    weighted_score: cell.weighted_score,
                }
            })
            .collect();

        tracing::debug!(
            buckets = buckets.len(),
            observed = self.cells.len(),
            messages = self.messages,
            width_secs = width,
            "Built activity series"
        );

        Ok(buckets)
    }
}

fn series_too_long(span_secs: f64) -> HypescanError {
    HypescanError::SeriesTooLong {
        span_secs,
        max_buckets: MAX_BUCKETS,
    }
}

/// Bucket a complete message sequence.
pub fn build_series<I>(
    messages: I,
    width_secs: f64,
    emotes: &EmoteWeightTable,
) -> HypescanResult<Vec<ActivityBucket>>
where
    I: IntoIterator<Item = Message>,
{
    let mut builder = ActivitySeriesBuilder::new(width_secs, emotes)?;
    for message in messages {
        builder.push(&message)?;
    }
    builder.finish()
}

/// Summary statistics over an activity series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    /// Buckets in the series, empty ones included.
    pub buckets: usize,
    /// Messages across all buckets.
    pub total_messages: usize,
    /// Sum of weighted scores.
    pub total_score: f64,
    /// Highest weighted score of any bucket.
    pub max_score: f64,
    /// Start of the first bucket holding `max_score`.
    pub max_at_secs: Option<OffsetSecs>,
    /// `total_score` averaged over all buckets.
    pub mean_score: f64,
}

impl SeriesStats {
    pub fn from_buckets(buckets: &[ActivityBucket]) -> Self {
        if buckets.is_empty() {
            return Self::default();
        }

        let mut stats = Self {
            buckets: buckets.len(),
            ..Self::default()
        };
        for bucket in buckets {
            stats.total_messages += bucket.raw_count;
            stats.total_score += bucket.weighted_score;
            if stats.max_at_secs.is_none() || bucket.weighted_score > stats.max_score {
                stats.max_score = bucket.weighted_score;
                stats.max_at_secs = Some(bucket.start_secs);
            }
        }
        stats.mean_score = stats.total_score / buckets.len() as f64;
        stats
    }

    /// A starting peak threshold: one fifth of the busiest bucket.
    pub fn suggested_peak_threshold(&self) -> f64 {
        0.2 * self.max_score
    }
}
