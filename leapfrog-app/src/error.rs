//! Application-level error type.

use leapfrog_core::SolverError;
use thiserror::Error;

/// Errors raised by the command-line application.
///
/// Wrapped errors keep their message in the source chain, so `{:#}` prints
/// each message once.
#[derive(Error, Debug)]
pub enum AppError {
    /// A setting is missing or inconsistent.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// The layered settings could not be read.
    #[error("Settings Error")]
    Settings(#[from] figment::Error),

    /// An output file could not be created or written.
    #[error("IO Error")]
    Io(#[from] std::io::Error),

    /// A CSV table could not be written.
    #[error("CSV Error")]
    Csv(#[from] csv::Error),

    /// The solver rejected the configuration or failed during the run.
    #[error(transparent)]
    Solver(#[from] SolverError),
}
