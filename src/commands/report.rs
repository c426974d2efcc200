//! One end-to-end report run
//!
//! Order is fixed: prepare the result file, connect, collect, normalize,
//! write. Declining the overwrite prompt stops the run before any lookup.

use std::path::PathBuf;

use super::collect::collect_accounts;
use crate::domain::{CollectionMode, NormalizedRecord};
use crate::error::{AppError, AppResult};
use crate::infrastructure::{
    prepare_report_file, write_report, ConfirmationProvider, DirectoryClient, PreparedReport,
    WriteMode,
};

/// What to report and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub output: PathBuf,
    pub mode: CollectionMode,
    pub append: bool,
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub output: PathBuf,
    pub rows_written: usize,
    pub file_state: PreparedReport,
}

/// Run the report.
///
/// `connect` is only called once the result file is ready, so a refused
/// overwrite never touches the directory.
pub fn run_report<D, F>(
    request: &ReportRequest,
    confirm: &mut dyn ConfirmationProvider,
    connect: F,
) -> AppResult<ReportSummary>
where
    D: DirectoryClient,
    F: FnOnce() -> AppResult<D>,
{
    tracing::info!(
        output = %request.output.display(),
        mode = %request.mode,
        append = request.append,
        "Starting password report"
    );

    let file_state = prepare_report_file(&request.output, request.append, confirm)?;

    let directory = connect()?;
    let records = collect_accounts(&request.mode, &directory)?;
    if records.is_empty() {
        return Err(AppError::EmptySource(format!(
            "no accounts returned for {}",
            request.mode
        )));
    }

    let normalized: Vec<NormalizedRecord> = records.iter().map(NormalizedRecord::from).collect();

    let mode = match file_state {
        PreparedReport::Appending => WriteMode::Append,
        PreparedReport::Created | PreparedReport::Overwritten => WriteMode::Replace,
    };
    let rows_written = write_report(&request.output, &normalized, mode)?;

    tracing::info!(
        output = %request.output.display(),
        rows = rows_written,
        "Password report complete"
    );

    Ok(ReportSummary {
        output: request.output.clone(),
        rows_written,
        file_state,
    })
}
