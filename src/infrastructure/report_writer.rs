//! CSV serialization of report rows

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use csv::WriterBuilder;

use crate::domain::NormalizedRecord;
use crate::error::{AppError, AppResult};

/// Report header, in column order
pub const REPORT_HEADER: [&str; 2] = ["Name", "PwdLastSet"];

/// How rows land in the report file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace any content with a header and the rows
    Replace,
    /// Add rows after existing content; the header is written only into an empty file
    Append,
}

/// Write `records` in order to the report at `path`.
///
/// Returns the number of data rows written. A failure is not retried.
pub fn write_report(path: &Path, records: &[NormalizedRecord], mode: WriteMode) -> AppResult<usize> {
    let open = match mode {
        WriteMode::Replace => File::create(path).map(|file| (file, true)),
        WriteMode::Append => open_for_append(path),
    };
    let (file, write_header) = open.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to open result file for writing");
        AppError::file_access(path, e)
    })?;

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    if write_header {
        writer.write_record(REPORT_HEADER)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|e| AppError::file_access(path, e))?;

    tracing::info!(
        path = %path.display(),
        rows = records.len(),
        mode = ?mode,
        "Result file written"
    );
    Ok(records.len())
}

/// Open `path` for appending. Returns the file and whether it is empty and
/// needs a header. A last row without a line terminator gets one first.
fn open_for_append(path: &Path) -> io::Result<(File, bool)> {
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;

    let len = file.metadata()?.len();
    if len == 0 {
        return Ok((file, true));
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        tracing::debug!(path = %path.display(), "Terminating last row before appending");
        file.write_all(b"\n")?;
    }

    Ok((file, false))
}
