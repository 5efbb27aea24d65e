//! Leapfrog Wave Application Library
//!
//! Command-line configuration, logging, progress reporting and output for the
//! leapfrog wave solver.

/// Command-line arguments and layered settings.
pub mod config;
/// Grid-refinement study.
pub mod convergence;
/// Application error type.
pub mod error;
/// Logger initialization.
pub mod logging;
/// Report lines and CSV output.
pub mod output;
/// Progress reporting.
pub mod progress;

// Include main.rs as a module
/// Application entry point.
pub mod main;

pub use config::AppConfig;
pub use error::AppError;

// Re-export the main function so it can be called from the root crate
pub use crate::main::main;
