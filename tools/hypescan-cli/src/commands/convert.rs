//! Convert a column-based highlight CSV into a marker list.

use std::path::PathBuf;

use hypescan_interchange::convert_file;

pub fn run(input: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    println!("Converting: {}", input.display());

    let stats = convert_file(&input, &output)
        .map_err(|e| anyhow::anyhow!("Failed to convert {}: {e}", input.display()))?;

    println!("  Converted {} of {} rows", stats.converted, stats.rows_seen);
    for error in &stats.errors.sample {
        println!("    Skipped {error}");
    }
    println!("  Markers saved to: {}", output.display());

    Ok(())
}
