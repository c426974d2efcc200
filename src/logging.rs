//! Logging infrastructure for the password report
//!
//! Sets up file-based logging to PwdLastSet.log, by default in the
//! executable's directory.

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file name
pub const LOG_FILE_NAME: &str = "PwdLastSet.log";

/// Get the directory containing the executable
fn get_executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Initialize logging to PwdLastSet.log in `log_dir`, or next to the
/// executable when no directory is given.
///
/// Returns a guard that must be kept alive for the duration of the program
/// to ensure all logs are flushed to disk. Fails when the log directory
/// cannot be created or the log file cannot be opened.
pub fn init_logging(log_dir: Option<&Path>) -> Result<WorkerGuard, InitError> {
    let log_dir = log_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(get_executable_dir);

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_that_is_a_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("notes.txt");
        std::fs::write(&not_a_dir, "x").unwrap();

        assert!(init_logging(Some(&not_a_dir)).is_err());
    }
}
