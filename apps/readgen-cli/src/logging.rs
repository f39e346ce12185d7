//! Logging initialization and log file management.
//!
//! Every command logs human-readable output to stderr. Commands with a log
//! channel (`serve`) also write JSON lines to
//! `.readgen/logs/<channel>/<timestamp>.log`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Maximum age of log files before cleanup, in days.
const LOG_RETENTION_DAYS: u64 = 3;

/// File name stem of each log file, in UTC.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Filter applied when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Initialize the global tracing subscriber.
///
/// Returns the [`WorkerGuard`] of the file writer when a channel is given;
/// it must be held until exit so buffered lines are flushed.
///
/// # Errors
///
/// Returns an error if the log directory or file cannot be created.
pub fn init_tracing(log_root: &Path, channel: Option<&str>) -> Result<Option<WorkerGuard>> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    let Some(channel) = channel else {
        tracing_subscriber::registry().with(stderr_layer).init();
        return Ok(None);
    };

    let (writer, guard) = open_log_writer(log_root, channel)?;
    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(env_filter()),
        )
        .init();

    Ok(Some(guard))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Directory holding all log channels.
fn logs_dir(log_root: &Path) -> PathBuf {
    log_root.join(".readgen").join("logs")
}

/// Create the channel directory and a fresh log file, wrapped in a
/// non-blocking writer.
fn open_log_writer(log_root: &Path, channel: &str) -> Result<(NonBlocking, WorkerGuard)> {
    let log_path = build_log_path(log_root, channel, Utc::now());
    let log_dir = log_path.parent().context(format!(
        "failed to resolve parent directory for log path: {}",
        log_path.display(),
    ))?;

    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory: {}", log_dir.display()))?;

    let log_file = fs::File::create(&log_path)
        .with_context(|| format!("failed to create log file: {}", log_path.display()))?;

    Ok(tracing_appender::non_blocking(log_file))
}

/// `.readgen/logs/<channel>/<YYYYMMDD_HHMMSS>.log` under `log_root`.
fn build_log_path(log_root: &Path, channel: &str, now: DateTime<Utc>) -> PathBuf {
    logs_dir(log_root)
        .join(channel)
        .join(format!("{}.log", now.format(TIMESTAMP_FORMAT)))
}

/// Point in time `days` days before `now`.
fn days_before(now: SystemTime, days: u64) -> SystemTime {
    now.checked_sub(Duration::from_secs(days * 24 * 60 * 60))
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Remove `.log` files older than [`LOG_RETENTION_DAYS`] and any channel
/// directories left empty.
///
/// Best-effort: runs before tracing is initialized, so problems are reported
/// with `eprintln!` and never fail the command.
pub fn cleanup_old_logs(log_root: &Path) {
    let dir = logs_dir(log_root);
    if dir.is_dir() {
        prune(&dir, days_before(SystemTime::now(), LOG_RETENTION_DAYS));
    }
}

/// Delete stale log files below `dir` and drop subdirectories that end up
/// empty. Returns whether `dir` itself is empty afterwards.
fn prune(dir: &Path, cutoff: SystemTime) -> bool {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("warning: failed to read log directory {}: {e}", dir.display());
            return false;
        }
    };

    let mut kept = 0usize;
    for path in entries.filter_map(|entry| entry.ok()).map(|entry| entry.path()) {
        let removed = if path.is_dir() {
            prune(&path, cutoff) && remove(&path, |p| fs::remove_dir(p))
        } else {
            is_stale_log(&path, cutoff) && remove(&path, |p| fs::remove_file(p))
        };
        if !removed {
            kept += 1;
        }
    }
    kept == 0
}

fn is_stale_log(path: &Path, cutoff: SystemTime) -> bool {
    path.extension().is_some_and(|ext| ext == "log")
        && fs::metadata(path)
            .and_then(|m| m.modified())
            .is_ok_and(|modified| modified < cutoff)
}

fn remove(path: &Path, op: fn(&Path) -> std::io::Result<()>) -> bool {
    match op(path) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("warning: failed to remove {}: {e}", path.display());
            false
        }
    }
}
