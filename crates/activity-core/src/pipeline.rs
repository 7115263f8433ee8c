//! End-to-end highlight pipeline.
//!
//! Records flow through the ingestor straight into the series builder, so
//! a log is read once and individual messages are never retained. Only
//! the bucket series is materialized, since detection needs all of it.

use hypescan_chat_model::activity::ActivityBucket;
use hypescan_common::error::{HypescanError, HypescanResult};
use hypescan_ingest::{IngestStats, Ingestor, SourceItem};

use crate::config::DetectionConfig;
use crate::detector::HighlightDetector;
use crate::report::{AnalysisReport, AnalysisWarning};
use crate::series::ActivitySeriesBuilder;

/// Bucket series plus the ingestion counters that produced it.
#[derive(Debug, Clone)]
pub struct SeriesOutcome {
    pub buckets: Vec<ActivityBucket>,
    pub ingest: IngestStats,
}

/// A validated configuration ready to process chat logs.
#[derive(Debug, Clone)]
pub struct HighlightPipeline {
    config: DetectionConfig,
    detector: HighlightDetector,
    config_warnings: Vec<AnalysisWarning>,
}

impl HighlightPipeline {
    /// Validate `config`. Fails before any input is touched.
    pub fn new(config: DetectionConfig) -> HypescanResult<Self> {
        let config_warnings = config.validate()?;
        let detector = HighlightDetector::from_config(&config)?;
        Ok(Self {
            config,
            detector,
            config_warnings,
        })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Same pipeline with a different peak threshold.
    pub fn with_peak_threshold(self, peak_threshold: f64) -> HypescanResult<Self> {
        Self::new(DetectionConfig {
            peak_threshold,
            ..self.config
        })
    }

    /// Ingest and bucket a record stream in one pass.
    ///
    /// Fails with `EmptyLog` when no record yields a message.
    pub fn ingest_series<I>(&self, records: I) -> HypescanResult<SeriesOutcome>
    where
        I: IntoIterator<Item = SourceItem>,
    {
        let emotes = &self.config.emote_weights;
        let ingestor = Ingestor::new(emotes);
        let mut builder = ActivitySeriesBuilder::new(self.config.interval_width_secs, emotes)?;

        let mut messages = ingestor.messages(records);
        for message in messages.by_ref() {
            builder.push(&message)?;
        }
        let ingest = messages.into_stats();

        if ingest.parsed == 0 {
            return Err(HypescanError::EmptyLog {
                skipped: ingest.skipped(),
            });
        }

        Ok(SeriesOutcome {
            buckets: builder.finish()?,
            ingest,
        })
    }

    /// Detect highlights over an already built series.
    pub fn analyze_series(&self, outcome: SeriesOutcome) -> AnalysisReport {
        let SeriesOutcome { buckets, ingest } = outcome;
        let (highlights, detection) = self.detector.detect_with_summary(&buckets);

        let mut warnings = self.config_warnings.clone();
        if ingest.skipped() > 0 {
            warnings.push(AnalysisWarning::SkippedRecords {
                count: ingest.skipped(),
            });
        }
        if ingest.out_of_order > 0 {
            warnings.push(AnalysisWarning::OutOfOrderTimestamps {
                count: ingest.out_of_order,
            });
        }

        tracing::info!(
            messages = ingest.parsed,
            skipped = ingest.skipped(),
            buckets = buckets.len(),
            highlights = highlights.len(),
            warnings = warnings.len(),
            "Chat analysis complete"
        );

        AnalysisReport {
            highlights,
            buckets,
            ingest,
            detection,
            warnings,
        }
    }

    /// Ingest, bucket and detect in one call.
    pub fn run<I>(&self, records: I) -> HypescanResult<AnalysisReport>
    where
        I: IntoIterator<Item = SourceItem>,
    {
        let outcome = self.ingest_series(records)?;
        Ok(self.analyze_series(outcome))
    }
}
