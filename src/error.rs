use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors
///
/// Every variant is fatal for the run. Per-account lookup misses never
/// become an `AppError`; they are recorded as `LookupOutcome::NotFound`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Overwrite of existing report {} declined by operator", .0.display())]
    OverwriteDeclined(PathBuf),

    #[error("File access failed for {}: {}", .path.display(), .source)]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory query failed: {0}")]
    BulkLookup(String),

    #[error("No accounts to report: {0}")]
    EmptySource(String),

    #[error("Not connected to Active Directory")]
    NotConnected,

    #[error("Windows API error: {0}")]
    WindowsError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AppError {
    /// Wrap an I/O error with the path it happened on
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Stable short code used in logs and operator output
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::ConfigError(_) => "CONFIG_ERROR",
            AppError::OverwriteDeclined(_) => "OVERWRITE_DECLINED",
            AppError::FileAccess { .. } => "FILE_ACCESS",
            AppError::BulkLookup(_) => "BULK_LOOKUP_FAILED",
            AppError::EmptySource(_) => "EMPTY_SOURCE",
            AppError::NotConnected => "NOT_CONNECTED",
            AppError::WindowsError(_) => "WINDOWS_ERROR",
            AppError::Csv(_) => "CSV_ERROR",
        }
    }

    /// True when the run stopped because the operator asked it to
    pub fn is_user_initiated(&self) -> bool {
        matches!(self, AppError::OverwriteDeclined(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_access_message_names_path() {
        let err = AppError::file_access(
            "report.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked"),
        );
        assert_eq!(err.error_code(), "FILE_ACCESS");
        let message = err.to_string();
        assert!(message.contains("report.csv"));
        assert!(message.contains("locked"));
    }

    #[test]
    fn test_only_declined_overwrite_is_user_initiated() {
        assert!(AppError::OverwriteDeclined(PathBuf::from("a.csv")).is_user_initiated());
        assert!(!AppError::BulkLookup("down".to_string()).is_user_initiated());
        assert!(!AppError::EmptySource("empty".to_string()).is_user_initiated());
    }
}
