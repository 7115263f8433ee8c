//! Detect highlights in a chat log.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use hypescan_activity_core::{AnalysisReport, HighlightPipeline, SeriesStats};
use hypescan_common::config::AppConfig;
use hypescan_common::timecode::format_clock;
use hypescan_ingest::{open_log, LogFormat};
use hypescan_interchange::{export_to_file, write_highlights, CsvFormat};

use super::{base_config, DetectionArgs};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to the chat log
    pub log: PathBuf,

    /// Write highlights here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output layout: highlights|markers
    #[arg(long, default_value = "highlights")]
    pub format: String,

    /// Chat log layout: auto|json|jsonl|text
    #[arg(long, default_value = "auto")]
    pub log_format: String,

    /// Start from a saved detection profile
    #[arg(long)]
    pub profile: Option<String>,

    /// Set the peak threshold to one fifth of the busiest bucket
    #[arg(long, conflicts_with = "peak_threshold")]
    pub auto_peak: bool,

    /// Also write the full analysis report as JSON
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    #[command(flatten)]
    pub detection: DetectionArgs,
}

pub fn run(app: &AppConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let format: CsvFormat = args.format.parse()?;
    let log_format = match args.log_format.as_str() {
        "auto" => None,
        other => Some(other.parse::<LogFormat>()?),
    };

    // Settings are checked before the log is opened or anything is written.
    let config = args
        .detection
        .apply(base_config(app, args.profile.as_deref())?)?;
    let mut pipeline = HighlightPipeline::new(config)?;

    let source = open_log(&args.log, log_format)
        .map_err(|e| anyhow::anyhow!("Failed to open chat log: {e}"))?;
    let outcome = pipeline.ingest_series(source)?;

    if args.auto_peak {
        let suggested = SeriesStats::from_buckets(&outcome.buckets).suggested_peak_threshold();
        tracing::info!(peak_threshold = suggested, "Using suggested peak threshold");
        pipeline = pipeline.with_peak_threshold(suggested)?;
    }
    let report = pipeline.analyze_series(outcome);

    match &args.output {
        Some(path) => {
            export_to_file(path, &report.highlights, format)?;
            print_summary(&mut std::io::stdout().lock(), &args, &pipeline, &report)?;
            println!("  Highlights saved to: {}", path.display());
        }
        None => {
            // stdout carries the CSV; the summary goes to stderr.
            print_summary(&mut std::io::stderr().lock(), &args, &pipeline, &report)?;
            write_highlights(std::io::stdout().lock(), &report.highlights, format)?;
        }
    }

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!(path = %path.display(), "Wrote analysis report");
    }

    Ok(())
}

fn print_summary(
    out: &mut dyn Write,
    args: &AnalyzeArgs,
    pipeline: &HighlightPipeline,
    report: &AnalysisReport,
) -> anyhow::Result<()> {
    let config = pipeline.config();
    let stats = report.series_stats();

    writeln!(out, "Analyzing chat log: {}", args.log.display())?;
    writeln!(
        out,
        "  Messages: {} parsed, {} skipped",
        report.ingest.parsed,
        report.ingest.skipped()
    )?;
    writeln!(
        out,
        "  Buckets: {} x {}s (max score {} at {})",
        stats.buckets,
        config.interval_width_secs,
        stats.max_score,
        format_clock(stats.max_at_secs.unwrap_or_default())
    )?;
    writeln!(
        out,
        "  Thresholds: peak >= {}, valley <= {}, min separation {}s",
        config.peak_threshold, config.valley_threshold, config.min_separation_secs
    )?;

    for warning in &report.warnings {
        writeln!(out, "  Warning: {warning}")?;
    }
    for error in report.ingest.errors.sample.iter().take(5) {
        writeln!(out, "    {error}")?;
    }

    writeln!(
        out,
        "  Highlights: {} ({} peaks, {} valleys)",
        report.highlights.len(),
        report.peaks().count(),
        report.valleys().count()
    )?;
    if report.highlights.is_empty() {
        writeln!(out, "  No bucket crossed either threshold.")?;
    }
    for highlight in &report.highlights {
        writeln!(
            out,
            "    {:<6} {} - {}  score {}",
            highlight.kind.as_str(),
            format_clock(highlight.timestamp_secs),
            format_clock(highlight.end_secs),
            highlight.score
        )?;
    }

    Ok(())
}
