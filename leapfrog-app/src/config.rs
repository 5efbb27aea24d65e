//! Command-line arguments and layered solver settings.

use crate::error::AppError;
use clap::{Parser, ValueEnum};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use leapfrog_core::config::{
    DEFAULT_COEFFICIENT, DEFAULT_GROWTH_LIMIT, DEFAULT_HORIZON, DEFAULT_STEPS, DEFAULT_TOTAL_STEPS,
};
use leapfrog_core::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Prefix for environment variables that override settings (e.g. `LEAPFROG_STEPS=40`).
pub const ENV_PREFIX: &str = "LEAPFROG_";

/// Log level for everything except progress reports.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GlobalLogLevel {
    /// Everything, including per-step traces.
    Trace,
    /// Setup details and allocation sizes.
    Debug,
    /// Run start and finish.
    #[default]
    Info,
    /// Stability warnings only.
    Warn,
    /// Failures only.
    Error,
}

/// Log level for the progress reporter.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressLogLevel {
    /// Show progress and everything below.
    Trace,
    /// Show progress at debug verbosity.
    Debug,
    /// Show progress lines.
    #[default]
    Info,
    /// Hide progress lines.
    Warn,
}

/// Command-line configuration for the leapfrog wave solver.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Edge length L of the cubic domain.
    #[arg(value_name = "L", allow_negative_numbers = true)]
    pub domain_length: f64,

    /// Number of grid intervals N per axis.
    #[arg(value_name = "N")]
    pub resolution: usize,

    /// Number of time steps to execute (the error is reported at this step).
    #[arg(long)]
    pub steps: Option<usize>,

    /// Number of steps K the horizon is divided into (tau = T / K).
    #[arg(long)]
    pub total_steps: Option<usize>,

    /// Simulation horizon T.
    #[arg(long)]
    pub horizon: Option<f64>,

    /// Wave coefficient a_2.
    #[arg(long, allow_negative_numbers = true)]
    pub coefficient: Option<f64>,

    /// Worker thread count (defaults to the available parallelism).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Largest |u| tolerated before the run is declared unstable.
    #[arg(long)]
    pub growth_limit: Option<f64>,

    /// Optional TOML file with solver settings.
    #[arg(short, long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Write the maximum error of every executed step to this CSV file.
    #[arg(long, value_name = "CSV_FILE")]
    pub error_history_csv: Option<PathBuf>,

    /// Run at N and 2N and report the observed order of convergence.
    #[arg(long, default_value_t = false)]
    pub convergence: bool,

    /// Optional: Path to save the convergence table as a CSV file.
    /// Only used if convergence is also enabled.
    #[arg(long, value_name = "CSV_FILE")]
    pub convergence_csv: Option<PathBuf>,

    /// Report progress updates every specified interval (e.g., "1s", "500ms").
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub report_progress_interval: Option<Duration>,

    /// Global log level (RUST_LOG directives still apply per module).
    #[arg(long, value_enum, default_value_t = GlobalLogLevel::Info)]
    pub log_level: GlobalLogLevel,

    /// Log level for progress reports.
    #[arg(long, value_enum, default_value_t = ProgressLogLevel::Info)]
    pub progress_log_level: ProgressLogLevel,
}

/// Solver settings that may come from a file or the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Simulation horizon T.
    pub horizon: f64,
    /// Steps K the horizon is divided into.
    pub total_steps: usize,
    /// Wave coefficient a_2.
    pub coefficient: f64,
    /// Steps actually executed.
    pub steps: usize,
    /// Worker thread count.
    pub workers: Option<usize>,
    /// Largest |u| tolerated.
    pub growth_limit: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            total_steps: DEFAULT_TOTAL_STEPS,
            coefficient: DEFAULT_COEFFICIENT,
            steps: DEFAULT_STEPS,
            workers: None,
            growth_limit: DEFAULT_GROWTH_LIMIT,
        }
    }
}

impl AppConfig {
    /// Layers the settings: defaults, then the TOML file, then `LEAPFROG_*`
    /// environment variables, then command-line options.
    ///
    /// # Errors
    ///
    /// * `AppError::Config` if the named config file does not exist.
    /// * `AppError::Settings` if a layer cannot be parsed.
    pub fn load_settings(&self) -> Result<SolverSettings, AppError> {
        let mut figment = Figment::from(Serialized::defaults(SolverSettings::default()));
        if let Some(path) = &self.config_file {
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            log::debug!("Loading settings from {:?}", path);
            figment = figment.merge(Toml::file(path));
        }
        let mut settings: SolverSettings = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;

        if let Some(steps) = self.steps {
            settings.steps = steps;
        }
        if let Some(total_steps) = self.total_steps {
            settings.total_steps = total_steps;
        }
        if let Some(horizon) = self.horizon {
            settings.horizon = horizon;
        }
        if let Some(coefficient) = self.coefficient {
            settings.coefficient = coefficient;
        }
        if let Some(workers) = self.workers {
            settings.workers = Some(workers);
        }
        if let Some(growth_limit) = self.growth_limit {
            settings.growth_limit = growth_limit;
        }
        Ok(settings)
    }

    /// Builds the validated core configuration for resolution `resolution`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Solver` wrapping the first invalid value.
    pub fn simulation_config(
        &self,
        settings: &SolverSettings,
        resolution: usize,
    ) -> Result<SimulationConfig, AppError> {
        let mut builder = SimulationConfig::builder(self.domain_length, resolution)
            .horizon(settings.horizon)
            .total_steps(settings.total_steps)
            .coefficient(settings.coefficient)
            .steps(settings.steps)
            .growth_limit(settings.growth_limit)
            .record_error_history(self.error_history_csv.is_some());
        if let Some(workers) = settings.workers {
            builder = builder.workers(workers);
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*; // Import items from parent module (config)
    use std::io::Write;

    #[test]
    fn test_positional_args() {
        let config = AppConfig::try_parse_from(["leapfrog-wave", "1.0", "10"]).unwrap();
        assert!((config.domain_length - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.resolution, 10);
        assert_eq!(config.steps, None); // Default
        assert_eq!(config.workers, None); // Default
        assert!(!config.convergence); // Default
        assert_eq!(config.log_level, GlobalLogLevel::Info); // Default
    }

    #[test]
    fn test_missing_or_malformed_args() {
        assert!(AppConfig::try_parse_from(["leapfrog-wave"]).is_err());
        assert!(AppConfig::try_parse_from(["leapfrog-wave", "1.0"]).is_err());
        assert!(AppConfig::try_parse_from(["leapfrog-wave", "abc", "10"]).is_err());
        assert!(AppConfig::try_parse_from(["leapfrog-wave", "1.0", "ten"]).is_err());
        assert!(AppConfig::try_parse_from(["leapfrog-wave", "1.0", "2.5"]).is_err());
    }

    #[test]
    fn test_negative_length_parses_but_fails_validation() {
        let config = AppConfig::try_parse_from(["leapfrog-wave", "-1.0", "10"]).unwrap();
        let settings = SolverSettings::default();
        let err = config.simulation_config(&settings, config.resolution).unwrap_err();
        assert!(err.to_string().contains("domain length"));
    }

    #[test]
    fn test_zero_resolution_fails_validation() {
        let config = AppConfig::try_parse_from(["leapfrog-wave", "1.0", "0"]).unwrap();
        let settings = SolverSettings::default();
        assert!(config.simulation_config(&settings, 0).is_err());
    }

    #[test]
    fn test_progress_interval() {
        let config = AppConfig::try_parse_from([
            "leapfrog-wave",
            "1.0",
            "10",
            "--report-progress-interval",
            "2s",
        ])
        .unwrap();
        assert_eq!(
            config.report_progress_interval,
            Some(Duration::from_secs(2))
        );
    }

    #[test]
    fn test_command_line_overrides_defaults() {
        let config = AppConfig::try_parse_from([
            "leapfrog-wave",
            "2.0",
            "16",
            "--steps",
            "8",
            "--coefficient",
            "0.5",
            "--workers",
            "2",
        ])
        .unwrap();
        let settings = config.load_settings().unwrap();
        assert_eq!(settings.steps, 8);
        assert_eq!(settings.workers, Some(2));
        assert!((settings.coefficient - 0.5).abs() < f64::EPSILON);
        assert_eq!(settings.total_steps, DEFAULT_TOTAL_STEPS);

        let sim = config.simulation_config(&settings, 16).unwrap();
        assert!((sim.spacing() - 0.125).abs() < 1e-15);
        assert_eq!(sim.workers, Some(2));
        assert!(!sim.record_error_history);
    }

    #[test]
    fn test_settings_file_is_layered_under_cli() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solver.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "steps = 12\ntotal_steps = 500\nhorizon = 1.0").unwrap();

        let path_arg = path.to_string_lossy().to_string();
        let config = AppConfig::try_parse_from([
            "leapfrog-wave",
            "1.0",
            "10",
            "--config",
            path_arg.as_str(),
            "--steps",
            "6",
        ])
        .unwrap();
        let settings = config.load_settings().unwrap();
        assert_eq!(settings.steps, 6); // CLI wins
        assert_eq!(settings.total_steps, 500); // from file
        assert!((settings.horizon - 1.0).abs() < f64::EPSILON);
        assert!((settings.coefficient - DEFAULT_COEFFICIENT).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_settings_file_is_an_error() {
        let config = AppConfig::try_parse_from([
            "leapfrog-wave",
            "1.0",
            "10",
            "--config",
            "/definitely/not/here.toml",
        ])
        .unwrap();
        assert!(matches!(config.load_settings(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_log_level() {
        let args = ["leapfrog-wave", "1.0", "10", "--log-level", "chatty"];
        assert!(AppConfig::try_parse_from(args).is_err());
    }
}
