use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

const DEFAULT_DIRECTIVE: &str = "quiz_catalog=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Initializes the logging system with console output and an optional daily-rotated
/// JSON log file.
///
/// The returned guard flushes the file writer; keep it alive for the life of the process.
/// If a global subscriber is already installed this one is dropped.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    if !config.json_file {
        install_console_only();
        return None;
    }

    if let Err(e) = fs::create_dir_all(&config.dir) {
        eprintln!(
            "Could not create log directory {}: {}",
            config.dir.display(),
            e
        );
    }

    let file_appender = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_name)
        .build(&config.dir)
    {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!(
                "Could not open log file in {}: {}; logging to console only",
                config.dir.display(),
                e
            );
            install_console_only();
            return None;
        }
    };
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    // JSON layer for file logging
    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    // Formatted layer for console logging
    let console_layer = fmt::layer().with_writer(std::io::stdout);

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(console_layer)
        .try_init()
    {
        eprintln!("Logging already initialized: {e}");
    }

    Some(guard)
}

fn install_console_only() {
    let console_layer = fmt::layer().with_writer(std::io::stdout);
    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter())
        .with(console_layer)
        .try_init()
    {
        eprintln!("Logging already initialized: {e}");
    }
}
