use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install console + daily-rolling file logging.
///
/// `RUST_LOG` overrides `base_level` when set. Warnings and errors go to
/// stderr, everything else to stdout. Files are written to `log_dir` with the
/// `coloc` prefix and at most five are kept.
///
/// The returned guard flushes the file writer when dropped; hold it until
/// the program exits.
pub fn setup_logging(base_level: &str, log_dir: &Path) -> Result<WorkerGuard> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(base_level).with_context(|| format!("Invalid log filter '{base_level}'"))?,
    };

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix("coloc")
        .filename_suffix("log")
        .max_log_files(5)
        .build(log_dir)
        .with_context(|| format!("Failed to create log file in {}", log_dir.display()))?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_writer = std::io::stdout
        .with_min_level(Level::INFO)
        .and(std::io::stderr.with_max_level(Level::WARN));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(true)
        .with_writer(console_writer);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Logger initialization failed: {e}"))?;

    Ok(guard)
}
