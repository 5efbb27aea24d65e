use anyhow::{Context, Result};
use leapfrog_core::StepError;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Header of the per-step error history file.
pub const HISTORY_HEADER: [&str; 3] = ["step", "time", "max_error"];

/// Formats the error line printed at the end of a run.
#[must_use]
pub fn format_error_line(step: usize, max_error: f64) -> String {
    format!("Max Error on step = {step}: {max_error:.6}")
}

/// Formats the timing line printed at the end of a run.
#[must_use]
pub fn format_timing_line(elapsed: Duration) -> String {
    format!("Work took {:.6} seconds", elapsed.as_secs_f64())
}

/// Writes the two report lines, error first.
///
/// # Errors
///
/// Returns the underlying I/O error if `out` cannot be written.
pub fn write_report<W: Write>(
    out: &mut W,
    step: usize,
    max_error: f64,
    elapsed: Duration,
) -> io::Result<()> {
    writeln!(out, "{}", format_error_line(step, max_error))?;
    writeln!(out, "{}", format_timing_line(elapsed))?;
    out.flush()
}

/// Saves the per-step error history as CSV (`step,time,max_error`).
pub fn save_error_history(history: &[StepError], output_path: &Path) -> Result<()> {
    log::info!("Writing error history ({} rows) to {:?}", history.len(), output_path);

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create error history file: {:?}", output_path))?;
    let mut wtr = csv::Writer::from_writer(io::BufWriter::new(file));

    wtr.write_record(HISTORY_HEADER)?;
    for entry in history {
        wtr.write_record([
            entry.step.to_string(),
            format!("{:.9}", entry.time),
            format!("{:.9e}", entry.max_error),
        ])?;
    }

    wtr.flush()
        .context("Failed to flush writer for error history file")?;
    Ok(())
}
