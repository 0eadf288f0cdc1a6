use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "main.log";

/// Keeps the log file writer alive.
///
/// Dropping the guard flushes buffered lines and closes the file, so hold it
/// in `main` for as long as the process should be logging.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _worker: WorkerGuard,
    log_path: PathBuf,
}

impl LoggingGuard {
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// Open `main.log` in `log_dir` for appending, creating the directory if
/// needed. Lines written through the returned writer reach the file once
/// the guard is dropped at the latest.
pub fn open_log_file(log_dir: &Path) -> Result<(NonBlocking, LoggingGuard)> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, worker) = tracing_appender::non_blocking(file_appender);

    Ok((
        writer,
        LoggingGuard {
            _worker: worker,
            log_path: log_dir.join(LOG_FILE_NAME),
        },
    ))
}

/// Install the global subscriber: plain lines to stderr plus an append-only
/// `main.log` in `log_dir`.
pub fn init_logging(log_dir: &Path) -> Result<LoggingGuard> {
    let (writer, guard) = open_log_file(log_dir)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(build_filter()?)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to install logging subscriber")?;

    info!(path = %guard.log_path().display(), "Logging to file");

    Ok(guard)
}

fn build_filter() -> Result<EnvFilter> {
    if let Ok(spec) = env::var("CROSSPOST_LOG") {
        if !spec.trim().is_empty() {
            return EnvFilter::try_new(spec).context("Invalid CROSSPOST_LOG filter");
        }
    }

    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new("info").context("Invalid default log filter"),
    }
}
