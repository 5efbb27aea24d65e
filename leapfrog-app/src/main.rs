// leapfrog-app/src/main.rs

use crate::config::AppConfig;
use crate::convergence;
use crate::logging;
use crate::output;
use crate::progress::{shared_callback, LogProgressReporter, ProgressReporter};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use leapfrog_core::{Simulation, SimulationConfig};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Entry point shared by the `leapfrog-wave` binary and the workspace root.
///
/// Argument errors exit with status 1 like every other failure; `--help` and
/// `--version` print and succeed.
pub fn main() -> Result<()> {
    let config = match AppConfig::try_parse() {
        Ok(config) => config,
        Err(e) => {
            e.print()?;
            if e.use_stderr() {
                return Err(anyhow!("invalid command line"));
            }
            return Ok(());
        }
    };
    logging::init_logger(&config);
    run(&config)
}

/// Runs the solver (or the convergence study) described by `config`.
///
/// The two report lines go to stdout; everything else is logged to stderr.
pub fn run(config: &AppConfig) -> Result<()> {
    log::info!("Leapfrog wave solver starting");
    log::debug!("Loaded Config: {:?}", config);

    let settings = config.load_settings()?;
    let sim_config = config.simulation_config(&settings, config.resolution)?;

    if config.convergence {
        run_convergence(config, &sim_config)
    } else {
        run_single(config, sim_config)
    }
}

fn run_single(config: &AppConfig, sim_config: SimulationConfig) -> Result<()> {
    let start_time = Instant::now();

    let mut simulation = Simulation::new(sim_config)?;
    let reporter = config
        .report_progress_interval
        .map(|interval| Arc::new(Mutex::new(LogProgressReporter::new(interval))));
    if let Some(reporter) = &reporter {
        simulation = simulation.with_progress_callback(shared_callback(reporter));
    }

    let result = simulation.run();
    if let Some(reporter) = &reporter {
        let mut guard = reporter
            .lock()
            .map_err(|_| anyhow!("progress reporter lock poisoned"))?;
        match &result {
            Ok(summary) => guard.finish(summary)?,
            Err(e) => guard.fail(e)?,
        }
    }
    let summary = result.context("Simulation failed")?;

    if let Some(path) = &config.error_history_csv {
        output::save_error_history(&summary.error_history, path)?;
    }

    let mut stdout = io::stdout().lock();
    output::write_report(
        &mut stdout,
        summary.step,
        summary.max_error,
        start_time.elapsed(),
    )?;
    Ok(())
}

fn run_convergence(config: &AppConfig, sim_config: &SimulationConfig) -> Result<()> {
    let start_time = Instant::now();
    let study = convergence::run_convergence_study(sim_config)?;

    let mut stdout = io::stdout().lock();
    convergence::report_convergence(&study, &mut stdout)?;
    if let Some(path) = &config.convergence_csv {
        convergence::write_convergence_csv(&study, path)
            .with_context(|| format!("Failed to write convergence CSV to {:?}", path))?;
        log::info!("Convergence table written to {:?}", path);
    }
    output::write_report(
        &mut stdout,
        study.fine.step,
        study.fine.max_error,
        start_time.elapsed(),
    )?;
    Ok(())
}
