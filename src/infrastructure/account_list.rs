//! Reading the named-account list file

use std::path::Path;

use crate::domain::AccountIdentifier;
use crate::error::{AppError, AppResult};

/// Read one account identifier per line.
///
/// Lines are trimmed and blank lines skipped. A leading byte order mark is
/// ignored. No identifiers at all is an `EmptySource` error.
pub fn read_account_list(path: &Path) -> AppResult<Vec<AccountIdentifier>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read user list");
        AppError::file_access(path, e)
    })?;

    let identifiers = parse_account_list(&contents);
    if identifiers.is_empty() {
        return Err(AppError::EmptySource(format!(
            "user list {} contains no account names",
            path.display()
        )));
    }

    tracing::info!(path = %path.display(), count = identifiers.len(), "Loaded user list");
    Ok(identifiers)
}

fn parse_account_list(contents: &str) -> Vec<AccountIdentifier> {
    contents
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        assert_eq!(
            parse_account_list("alice\r\nbob\n\n  carol  \nalice\n"),
            vec!["alice", "bob", "carol", "alice"]
        );
    }

    #[test]
    fn test_parse_strips_byte_order_mark() {
        assert_eq!(parse_account_list("\u{feff}alice\nbob"), vec!["alice", "bob"]);
    }

    #[test]
    fn test_empty_file_is_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.txt");
        fs::write(&path, "").unwrap();

        let err = read_account_list(&path).unwrap_err();
        assert!(matches!(err, AppError::EmptySource(_)));
    }

    #[test]
    fn test_blank_lines_only_is_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.txt");
        fs::write(&path, "\n   \n\t\n").unwrap();

        assert!(matches!(read_account_list(&path), Err(AppError::EmptySource(_))));
    }

    #[test]
    fn test_missing_file_is_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        match read_account_list(&path) {
            Err(AppError::FileAccess { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected FileAccess, got {:?}", other),
        }
    }
}
