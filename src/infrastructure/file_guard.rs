//! Safe creation of the report file before any directory work
//!
//! The guard runs first. An existing report is only replaced after the
//! operator agrees, or kept and appended to when append mode is on.

use std::fs::{File, OpenOptions};
use std::path::Path;

use super::prompt::ConfirmationProvider;
use crate::error::{AppError, AppResult};

/// State of the report file once the guard lets the run proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreparedReport {
    /// File did not exist and was created empty
    Created,
    /// File existed and was truncated after confirmation
    Overwritten,
    /// File existed, is writable, and keeps its content
    Appending,
}

/// Make the report file ready for writing.
///
/// Creating or truncating happens here, so a later failure still leaves an
/// empty report on disk.
pub fn prepare_report_file(
    path: &Path,
    allow_append: bool,
    confirm: &mut dyn ConfirmationProvider,
) -> AppResult<PreparedReport> {
    if path.as_os_str().is_empty() {
        return Err(AppError::ConfigError("result file path is empty".to_string()));
    }

    if !path.exists() {
        truncate_create(path)?;
        tracing::info!(path = %path.display(), "Created result file");
        return Ok(PreparedReport::Created);
    }

    if allow_append {
        OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| {
                tracing::error!(path = %path.display(), error = %e, "Result file is not writable for append");
                AppError::file_access(path, e)
            })?;
        tracing::info!(path = %path.display(), "Appending to existing result file");
        return Ok(PreparedReport::Appending);
    }

    let question = format!("Result file {} already exists. Overwrite it?", path.display());
    if !confirm.confirm(&question)? {
        tracing::info!(path = %path.display(), "Operator declined to overwrite result file");
        return Err(AppError::OverwriteDeclined(path.to_path_buf()));
    }

    truncate_create(path)?;
    tracing::info!(path = %path.display(), "Overwrote existing result file");
    Ok(PreparedReport::Overwritten)
}

fn truncate_create(path: &Path) -> AppResult<()> {
    File::create(path).map(drop).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to create result file");
        AppError::file_access(path, e)
    })
}
