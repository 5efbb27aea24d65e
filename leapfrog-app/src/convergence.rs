//! Grid-refinement study: the same run at N and 2N.
//!
//! The leapfrog scheme is second order in space, so halving h should divide the
//! error by roughly four. The study reports the ratio and `log2(ratio)`.

use crate::error::AppError;
use leapfrog_core::{Simulation, SimulationConfig};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// One resolution of the study.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceRow {
    /// Number of intervals per axis.
    pub resolution: usize,
    /// Grid spacing `L / N`.
    pub spacing: f64,
    /// Step at which the error was measured.
    pub step: usize,
    /// Maximum absolute error at `step`.
    pub max_error: f64,
    /// Wall-clock time of the run.
    pub total_time: Duration,
}

/// Coarse and fine runs of a refinement study.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceStudy {
    /// Run at the requested resolution.
    pub coarse: ConvergenceRow,
    /// Run at twice the requested resolution.
    pub fine: ConvergenceRow,
}

impl ConvergenceStudy {
    /// Coarse error divided by fine error.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.coarse.max_error / self.fine.max_error
    }

    /// Observed order of accuracy, `log2` of the ratio.
    #[must_use]
    pub fn observed_order(&self) -> f64 {
        self.ratio().log2()
    }
}

fn run_row(config: SimulationConfig) -> Result<ConvergenceRow, AppError> {
    let resolution = config.resolution;
    let spacing = config.spacing();
    let start_time = Instant::now();
    let summary = Simulation::new(config)?.run()?;
    let total_time = start_time.elapsed();
    log::info!(
        "N = {resolution}: max error {:.6e} at step {} ({:.3?})",
        summary.max_error,
        summary.step,
        total_time
    );
    Ok(ConvergenceRow {
        resolution,
        spacing,
        step: summary.step,
        max_error: summary.max_error,
        total_time,
    })
}

/// Runs `base` and the same configuration with twice the resolution.
///
/// Time step, step count and coefficient are shared, so only h changes.
///
/// # Errors
///
/// * `AppError::Config` if `2N` overflows.
/// * `AppError::Solver` if either run fails.
pub fn run_convergence_study(base: &SimulationConfig) -> Result<ConvergenceStudy, AppError> {
    let fine_resolution = base.resolution.checked_mul(2).ok_or_else(|| {
        AppError::Config(format!(
            "resolution {} is too large to refine",
            base.resolution
        ))
    })?;

    log::info!(
        "Convergence study: N = {} and N = {}",
        base.resolution,
        fine_resolution
    );
    let coarse = run_row(base.clone())?;

    let mut fine_config = base.clone();
    fine_config.resolution = fine_resolution;
    fine_config.validate()?;
    let fine = run_row(fine_config)?;

    Ok(ConvergenceStudy { coarse, fine })
}

/// Prints the study as a small table followed by the observed order.
pub fn report_convergence<W: Write>(study: &ConvergenceStudy, out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- Convergence Study ---")?;
    writeln!(
        out,
        "{:<6} | {:<10} | {:<6} | {:<14} | {:<12}",
        "N", "h", "Step", "Max Error", "Time (s)"
    )?;
    writeln!(out, "{:-<60}", "")?;
    for row in [&study.coarse, &study.fine] {
        writeln!(
            out,
            "{:<6} | {:<10.6} | {:<6} | {:<14.6e} | {:<12.6}",
            row.resolution,
            row.spacing,
            row.step,
            row.max_error,
            row.total_time.as_secs_f64()
        )?;
    }
    writeln!(out, "{:-<60}", "")?;
    writeln!(
        out,
        "Error ratio: {:.3} (observed order {:.3})",
        study.ratio(),
        study.observed_order()
    )?;
    out.flush()
}

/// Writes both rows as CSV (`resolution,spacing,step,max_error,seconds`).
///
/// # Errors
///
/// * `AppError::Io` if the file cannot be created.
/// * `AppError::Csv` if a row cannot be written.
pub fn write_convergence_csv(study: &ConvergenceStudy, path: &Path) -> Result<(), AppError> {
    let file = File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record(["resolution", "spacing", "step", "max_error", "seconds"])?;
    for row in [&study.coarse, &study.fine] {
        wtr.write_record([
            row.resolution.to_string(),
            format!("{:.9}", row.spacing),
            row.step.to_string(),
            format!("{:.9e}", row.max_error),
            format!("{:.6}", row.total_time.as_secs_f64()),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn study() -> ConvergenceStudy {
        let config = SimulationConfig::builder(1.0, 10).build().unwrap();
        run_convergence_study(&config).unwrap()
    }

    #[test]
    fn test_refinement_is_second_order() {
        let study = study();
        assert_eq!(study.coarse.resolution, 10);
        assert_eq!(study.fine.resolution, 20);
        assert_eq!(study.coarse.step, study.fine.step);
        assert!((study.fine.spacing - 0.05).abs() < 1e-15);
        let order = study.observed_order();
        assert!((1.5..2.5).contains(&order), "observed order {order}");
    }

    #[test]
    fn test_report_and_csv() {
        let study = study();
        let mut out = Vec::new();
        report_convergence(&study, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Convergence Study"));
        assert!(text.contains("observed order"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("convergence.csv");
        write_convergence_csv(&study, &path).unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            reader.headers().unwrap(),
            &csv::StringRecord::from(vec!["resolution", "spacing", "step", "max_error", "seconds"])
        );
        assert_eq!(reader.records().count(), 2);
    }

    #[test]
    fn test_csv_into_missing_directory_is_an_io_error() {
        let row = ConvergenceRow {
            resolution: 4,
            spacing: 0.25,
            step: 20,
            max_error: 1e-3,
            total_time: Duration::from_millis(5),
        };
        let study = ConvergenceStudy {
            coarse: row.clone(),
            fine: row,
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("convergence.csv");
        assert!(matches!(
            write_convergence_csv(&study, &path),
            Err(AppError::Io(_))
        ));
    }

    #[test]
    fn test_overflowing_resolution_is_rejected() {
        let mut config = SimulationConfig::builder(1.0, 10).build().unwrap();
        config.resolution = usize::MAX;
        assert!(matches!(
            run_convergence_study(&config),
            Err(AppError::Config(_))
        ));
    }
}
