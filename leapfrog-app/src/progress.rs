// leapfrog-app/src/progress.rs

use anyhow::Result;
use leapfrog_core::{ProgressCallback, ProgressInfo, RunSummary, SolverError};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Trait for reporting the progress of a solver run.
///
/// Implementors of this trait can display progress information in various ways
/// (e.g., log lines, a terminal bar).
pub trait ProgressReporter: Send {
    /// Called after every completed time level.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if reporting was successful.
    /// * `Err(anyhow::Error)` if reporting failed; the run is aborted.
    fn report(&mut self, info: &ProgressInfo) -> Result<()>;

    /// Called when the run completes successfully.
    fn finish(&mut self, summary: &RunSummary) -> Result<()>;

    /// Called when the run fails with an error.
    fn fail(&mut self, error: &SolverError) -> Result<()>;
}

/// Logs a progress line at most once per interval, plus one for the final level.
#[derive(Debug)]
pub struct LogProgressReporter {
    interval: Duration,
    last_report: Instant,
    reports: usize,
}

impl LogProgressReporter {
    /// Creates a reporter that logs at most once per `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_report: Instant::now(),
            reports: 0,
        }
    }

    /// Number of progress lines emitted so far.
    #[must_use]
    pub const fn reports(&self) -> usize {
        self.reports
    }
}

impl ProgressReporter for LogProgressReporter {
    fn report(&mut self, info: &ProgressInfo) -> Result<()> {
        let is_last = info.step >= info.total_steps;
        if !is_last && self.last_report.elapsed() < self.interval {
            return Ok(());
        }
        let percentage = if info.total_steps > 0 {
            (info.step as f64 / info.total_steps as f64) * 100.0
        } else {
            100.0
        };
        log::info!(
            "Progress: step {}/{} ({:.1}%), t = {:.4}, max |u| = {:.4e}, elapsed {:.2?}",
            info.step,
            info.total_steps,
            percentage,
            info.time,
            info.max_amplitude,
            info.elapsed
        );
        self.last_report = Instant::now();
        self.reports += 1;
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<()> {
        log::info!(
            "Solver completed successfully: step {} in {:.3?}",
            summary.step,
            summary.elapsed
        );
        Ok(())
    }

    fn fail(&mut self, error: &SolverError) -> Result<()> {
        log::error!("Solver failed: {}", error);
        Ok(())
    }
}

/// Wraps a shared reporter into the callback the simulation runner expects.
///
/// The caller keeps its own handle to call `finish` or `fail` once the run ends.
pub fn shared_callback<R>(reporter: &Arc<Mutex<R>>) -> ProgressCallback
where
    R: ProgressReporter + 'static,
{
    let reporter = Arc::clone(reporter);
    Box::new(move |info: ProgressInfo| {
        let mut guard = reporter
            .lock()
            .map_err(|_| SolverError::Callback("progress reporter lock poisoned".to_string()))?;
        guard
            .report(&info)
            .map_err(|e| SolverError::Callback(e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use leapfrog_core::{Simulation, SimulationConfig};

    #[derive(Default)]
    struct Recording {
        steps: Vec<usize>,
        finished: bool,
    }

    impl ProgressReporter for Recording {
        fn report(&mut self, info: &ProgressInfo) -> Result<()> {
            self.steps.push(info.step);
            Ok(())
        }

        fn finish(&mut self, _summary: &RunSummary) -> Result<()> {
            self.finished = true;
            Ok(())
        }

        fn fail(&mut self, _error: &SolverError) -> Result<()> {
            Ok(())
        }
    }

    fn info(step: usize, total_steps: usize) -> ProgressInfo {
        ProgressInfo {
            step,
            total_steps,
            time: 0.0,
            elapsed: Duration::ZERO,
            max_amplitude: 1.0,
        }
    }

    #[test]
    fn test_zero_interval_reports_every_level() {
        let mut reporter = LogProgressReporter::new(Duration::ZERO);
        for step in 0..=4 {
            reporter.report(&info(step, 4)).unwrap();
        }
        assert_eq!(reporter.reports(), 5);
    }

    #[test]
    fn test_long_interval_reports_only_last_level() {
        let mut reporter = LogProgressReporter::new(Duration::from_secs(3600));
        for step in 0..=4 {
            reporter.report(&info(step, 4)).unwrap();
        }
        assert_eq!(reporter.reports(), 1);
    }

    #[test]
    fn test_shared_callback_forwards_every_level() {
        let reporter = Arc::new(Mutex::new(Recording::default()));
        let config = SimulationConfig::builder(1.0, 4).steps(3).build().unwrap();
        let mut sim = Simulation::new(config)
            .unwrap()
            .with_progress_callback(shared_callback(&reporter));
        let summary = sim.run().unwrap();
        let mut guard = reporter.lock().unwrap();
        guard.finish(&summary).unwrap();
        assert_eq!(guard.steps, vec![0, 1, 2, 3]);
        assert!(guard.finished);
    }

    #[test]
    fn test_reporter_error_aborts_run() {
        struct Failing;
        impl ProgressReporter for Failing {
            fn report(&mut self, _info: &ProgressInfo) -> Result<()> {
                anyhow::bail!("terminal closed")
            }
            fn finish(&mut self, _summary: &RunSummary) -> Result<()> {
                Ok(())
            }
            fn fail(&mut self, _error: &SolverError) -> Result<()> {
                Ok(())
            }
        }

        let reporter = Arc::new(Mutex::new(Failing));
        let config = SimulationConfig::builder(1.0, 4).build().unwrap();
        let result = Simulation::new(config)
            .unwrap()
            .with_progress_callback(shared_callback(&reporter))
            .run();
        assert_eq!(
            result,
            Err(SolverError::Callback("terminal closed".to_string()))
        );
    }
}
