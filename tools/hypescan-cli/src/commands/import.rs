//! List the highlights in a CSV file.

use std::path::PathBuf;

use hypescan_common::timecode::format_clock;
use hypescan_interchange::import::import_from_file;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Importing highlights from: {}", path.display());

    let (highlights, stats) = import_from_file(&path)
        .map_err(|e| anyhow::anyhow!("Failed to import highlights: {e}"))?;

    println!(
        "  Rows: {} read, {} imported, {} skipped",
        stats.rows_seen,
        stats.imported,
        stats.skipped()
    );
    if stats.defaulted > 0 {
        println!(
            "  {} row(s) had no readable kind or score and were imported as peaks",
            stats.defaulted
        );
    }
    for error in &stats.errors.sample {
        println!("    {error}");
    }

    for highlight in &highlights {
        println!(
            "  {:<6} {:>9} ({})  score {}",
            highlight.kind.as_str(),
            highlight.timestamp_secs,
            format_clock(highlight.timestamp_secs),
            highlight.score
        );
    }

    Ok(())
}
