//! Logging setup for the application.

use crate::config::{AppConfig, GlobalLogLevel, ProgressLogLevel};
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Module path the progress reporter logs under.
pub const PROGRESS_TARGET: &str = "leapfrog_app::progress";

const fn progress_filter(level: ProgressLogLevel) -> LevelFilter {
    match level {
        ProgressLogLevel::Trace => LevelFilter::Trace,
        ProgressLogLevel::Debug => LevelFilter::Debug,
        ProgressLogLevel::Info => LevelFilter::Info,
        ProgressLogLevel::Warn => LevelFilter::Warn,
    }
}

const fn global_filter(level: GlobalLogLevel) -> LevelFilter {
    match level {
        GlobalLogLevel::Trace => LevelFilter::Trace,
        GlobalLogLevel::Debug => LevelFilter::Debug,
        GlobalLogLevel::Info => LevelFilter::Info,
        GlobalLogLevel::Warn => LevelFilter::Warn,
        GlobalLogLevel::Error => LevelFilter::Error,
    }
}

/// Initializes the logger from the application settings.
///
/// The global level applies to every module, the progress level only to the
/// progress reporter. `RUST_LOG` directives are read first and still apply to
/// the modules they name. Logs go to stderr so stdout carries only the report.
///
/// Calling this twice is harmless: the second initialization is skipped.
pub fn init_logger(config: &AppConfig) {
    let env = Env::default().filter_or("RUST_LOG", "info");
    let mut builder = Builder::from_env(env);

    builder.filter_level(global_filter(config.log_level));
    builder.filter_module(PROGRESS_TARGET, progress_filter(config.progress_log_level));

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
        return;
    }

    log::debug!(
        "Logger initialized with global log level: {:?}, progress log level: {:?}",
        config.log_level,
        config.progress_log_level
    );
}
