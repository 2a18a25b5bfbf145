use chrono::NaiveDate;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{prelude::*, EnvFilter};
use xthreads_core::CoreError;

const DEFAULT_FILTER: &str = "info";

pub fn log_path(log_dir: &Path, date: NaiveDate) -> PathBuf {
    log_dir.join(format!("{}.log", date.format("%Y-%m-%d")))
}

/// Logs to stdout and appends to `log_dir/<date>.log`. `RUST_LOG` overrides
/// the default `info` level.
pub fn init(log_dir: &Path, date: NaiveDate) -> Result<PathBuf, CoreError> {
    fs::create_dir_all(log_dir)?;
    let path = log_path(log_dir, date);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(filter()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(filter()),
        )
        .try_init()
        .map_err(|e| CoreError::Internal {
            message: format!("failed to install log subscriber: {}", e),
        })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_is_dated() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(
            log_path(Path::new("logs"), date),
            PathBuf::from("logs/2026-10-19.log")
        );
    }
}
