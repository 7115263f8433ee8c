//! Hypescan Activity Core — The Highlight Engine
//!
//! Converts a chat message stream into timestamped highlights:
//! - **Series:** Bucket messages into fixed-width windows with weighted scores
//! - **Detector:** Classify buckets against thresholds, reduce runs, merge
//!   near-duplicates
//! - **Pipeline:** Validate configuration, ingest, build, detect, report
//!
//! Apart from the profile store, this crate is pure computation. Every
//! stage receives its configuration explicitly.

pub mod config;
pub mod detector;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod series;

pub use config::DetectionConfig;
pub use detector::HighlightDetector;
pub use pipeline::HighlightPipeline;
pub use report::{AnalysisReport, AnalysisWarning};
pub use series::{ActivitySeriesBuilder, SeriesStats};
