//! Active Directory search operations using Windows ADSI IDirectorySearch
//!
//! This module provides the LDAP search used to read `pwdLastSet` for user
//! accounts, plus the filter and attribute helpers around it.

use crate::domain::{RawAccountRecord, UNSET_TIMESTAMP};
use crate::error::{AppError, AppResult};
use std::collections::HashMap;

#[cfg(windows)]
use super::ad_connection::ensure_com_initialized;
#[cfg(windows)]
use windows::{
    core::{BSTR, Interface, PCWSTR},
    Win32::Networking::ActiveDirectory::*,
};

/// Filter matching user accounts (not contacts or computers)
pub const USER_ACCOUNT_FILTER: &str = "(&(objectCategory=person)(objectClass=user))";

/// Attributes requested for every account lookup
pub const ACCOUNT_ATTRIBUTES: [&str; 3] = ["name", "sAMAccountName", "pwdLastSet"];

/// Search result row containing attribute values
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub attributes: HashMap<String, Vec<String>>,
}

impl SearchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used when assembling rows by hand
    pub fn with(mut self, attr: &str, value: &str) -> Self {
        self.attributes
            .entry(attr.to_lowercase())
            .or_default()
            .push(value.to_string());
        self
    }

    pub fn get(&self, attr: &str) -> Option<&String> {
        self.attributes.get(&attr.to_lowercase()).and_then(|v| v.first())
    }
}

/// HRESULT from GetNextRow once the result set is exhausted
#[cfg(any(windows, test))]
const S_ADS_NOMORE_ROWS: u32 = 0x0000_5012;

/// What a GetNextRow HRESULT means for the read loop
#[cfg(any(windows, test))]
#[derive(Debug, PartialEq, Eq)]
enum RowStatus {
    Row,
    Done,
    Failed(u32),
}

#[cfg(any(windows, test))]
fn row_status(hresult: i32) -> RowStatus {
    let code = hresult as u32;
    if hresult < 0 {
        RowStatus::Failed(code)
    } else if code == S_ADS_NOMORE_ROWS {
        RowStatus::Done
    } else {
        RowStatus::Row
    }
}

/// Perform a subtree LDAP search under `base_dn`.
///
/// A failure while reading rows fails the whole search; partial results are
/// never returned.
#[cfg(windows)]
pub fn ldap_search(base_dn: &str, filter: &str, attributes: &[&str]) -> AppResult<Vec<SearchResult>> {
    tracing::info!(
        base_dn = base_dn,
        filter = filter,
        "LDAP SEARCH: Starting query"
    );
    // SAFETY: COM is initialized before any ADSI call, every BSTR outlives
    // the call it is passed to, each column fetched with GetColumn is
    // released with FreeColumn, and the search handle is closed before
    // returning. Interface reference counts are managed by the windows crate.
    unsafe {
        ensure_com_initialized()?;

        let ldap_path = format!("LDAP://{}", base_dn);
        let path_bstr = BSTR::from(ldap_path.as_str());

        let mut search: Option<IDirectorySearch> = None;
        ADsOpenObject(
            PCWSTR(path_bstr.as_ptr()),
            PCWSTR::null(),
            PCWSTR::null(),
            ADS_SECURE_AUTHENTICATION,
            &<IDirectorySearch as Interface>::IID,
            &mut search as *mut _ as *mut *mut std::ffi::c_void,
        )
        .map_err(|e| {
            let hresult = e.code().0 as u32;
            tracing::error!(
                base_dn = base_dn,
                error = %e,
                hresult = format!("0x{:08X}", hresult),
                "LDAP SEARCH FAILED: ADsOpenObject error"
            );
            AppError::BulkLookup(format!("Failed to open {}: {} (HRESULT: 0x{:08X})", base_dn, e, hresult))
        })?;

        let search = search.ok_or_else(|| {
            AppError::BulkLookup(format!("Search interface not available for {}", base_dn))
        })?;

        let mut prefs = [
            ADS_SEARCHPREF_INFO {
                dwSearchPref: ADS_SEARCHPREF_SEARCH_SCOPE,
                vValue: ADSVALUE {
                    dwType: ADSTYPE_INTEGER,
                    Anonymous: ADSVALUE_0 {
                        Integer: ADS_SCOPE_SUBTREE.0 as u32,
                    },
                },
                dwStatus: ADS_STATUS_S_OK,
            },
            ADS_SEARCHPREF_INFO {
                dwSearchPref: ADS_SEARCHPREF_PAGESIZE,
                vValue: ADSVALUE {
                    dwType: ADSTYPE_INTEGER,
                    Anonymous: ADSVALUE_0 { Integer: 1000 },
                },
                dwStatus: ADS_STATUS_S_OK,
            },
        ];

        if let Err(e) = search.SetSearchPreference(prefs.as_mut_ptr(), prefs.len() as u32) {
            tracing::warn!(error = %e, "Failed to set search preferences, continuing with defaults");
        }

        let attr_bstrs: Vec<BSTR> = attributes.iter().map(|a| BSTR::from(*a)).collect();
        let attr_ptrs: Vec<PCWSTR> = attr_bstrs.iter().map(|b| PCWSTR(b.as_ptr())).collect();
        let filter_bstr = BSTR::from(filter);

        let search_handle = search
            .ExecuteSearch(
                PCWSTR(filter_bstr.as_ptr()),
                attr_ptrs.as_ptr(),
                attributes.len() as u32,
            )
            .map_err(|e| {
                let hresult = e.code().0 as u32;
                tracing::error!(
                    base_dn = base_dn,
                    filter = filter,
                    error = %e,
                    hresult = format!("0x{:08X}", hresult),
                    "LDAP SEARCH FAILED: ExecuteSearch error"
                );
                AppError::BulkLookup(format!("Search execution failed: {} (HRESULT: 0x{:08X})", e, hresult))
            })?;

        let mut results = Vec::new();
        const LOG_INTERVAL: usize = 5000;

        loop {
            match row_status(search.GetNextRow(search_handle).0) {
                RowStatus::Row => {}
                RowStatus::Done => break,
                RowStatus::Failed(hresult) => {
                    tracing::error!(
                        base_dn = base_dn,
                        rows_read = results.len(),
                        hresult = format!("0x{:08X}", hresult),
                        "LDAP SEARCH FAILED: GetNextRow error"
                    );
                    if let Err(e) = search.CloseSearchHandle(search_handle) {
                        tracing::warn!(error = %e, "Failed to close LDAP search handle");
                    }
                    return Err(AppError::BulkLookup(format!(
                        "Reading search results failed after {} row(s) (HRESULT: 0x{:08X})",
                        results.len(),
                        hresult
                    )));
                }
            }

            if (results.len() + 1) % LOG_INTERVAL == 0 {
                tracing::info!(
                    base_dn = base_dn,
                    rows_processed = results.len() + 1,
                    "LDAP search in progress (large result set)..."
                );
            }

            let mut result = SearchResult::new();

            for attr in attributes {
                let attr_bstr = BSTR::from(*attr);
                let mut column: ADS_SEARCH_COLUMN = std::mem::zeroed();

                if search.GetColumn(search_handle, PCWSTR(attr_bstr.as_ptr()), &mut column).is_ok() {
                    let values = extract_column_values(&column);
                    if !values.is_empty() {
                        result.attributes.insert(attr.to_lowercase(), values);
                    }
                    if let Err(e) = search.FreeColumn(&mut column) {
                        tracing::warn!(attr = attr, error = %e, "Failed to free LDAP column");
                    }
                }
            }

            results.push(result);
        }

        if let Err(e) = search.CloseSearchHandle(search_handle) {
            tracing::warn!(error = %e, "Failed to close LDAP search handle");
        }
        tracing::info!(
            base_dn = base_dn,
            result_count = results.len(),
            "LDAP search completed"
        );
        Ok(results)
    }
}

/// Non-Windows fallback - returns error
#[cfg(not(windows))]
pub fn ldap_search(base_dn: &str, filter: &str, _attributes: &[&str]) -> AppResult<Vec<SearchResult>> {
    tracing::error!(base_dn = base_dn, filter = filter, "LDAP search requires Windows ADSI");
    Err(AppError::NotConnected)
}

/// Extract values from an ADS_SEARCH_COLUMN
#[cfg(windows)]
unsafe fn extract_column_values(column: &ADS_SEARCH_COLUMN) -> Vec<String> {
    if column.pADsValues.is_null() || column.dwNumValues == 0 {
        return Vec::new();
    }

    (0..column.dwNumValues as usize)
        .filter_map(|i| extract_adsvalue(&*column.pADsValues.add(i)))
        .collect()
}

/// Extract a string from an ADSVALUE
#[cfg(windows)]
unsafe fn extract_adsvalue(value: &ADSVALUE) -> Option<String> {
    match value.dwType {
        ADSTYPE_DN_STRING | ADSTYPE_CASE_EXACT_STRING | ADSTYPE_CASE_IGNORE_STRING
        | ADSTYPE_PRINTABLE_STRING | ADSTYPE_NUMERIC_STRING => {
            let ptr = value.Anonymous.CaseIgnoreString;
            if ptr.is_null() {
                return None;
            }
            Some(String::from_utf16_lossy(ptr.as_wide()))
        }
        ADSTYPE_INTEGER => Some(value.Anonymous.Integer.to_string()),
        // pwdLastSet arrives as a LARGE_INTEGER FILETIME
        ADSTYPE_LARGE_INTEGER => Some(value.Anonymous.LargeInteger.to_string()),
        _ => None,
    }
}

/// Escape special characters in LDAP filter values
///
/// Escapes characters that have special meaning in LDAP filters:
/// * `\` → `\5c`
/// * `*` → `\2a`
/// * `(` → `\28`
/// * `)` → `\29`
/// * `\0` → `\00`
pub fn escape_ldap_filter(value: &str) -> String {
    value
        .replace('\\', "\\5c")
        .replace('*', "\\2a")
        .replace('(', "\\28")
        .replace(')', "\\29")
        .replace('\0', "\\00")
}

/// Filter matching one user account by logon name, name, or display name
pub fn named_account_filter(identifier: &str) -> String {
    let escaped = escape_ldap_filter(identifier);
    format!(
        "(&(objectCategory=person)(objectClass=user)(|(sAMAccountName={0})(name={0})(displayName={0})))",
        escaped
    )
}

/// Convert a search result to an account record.
///
/// Uses `name`, falling back to `sAMAccountName`. A missing or unparsable
/// `pwdLastSet` counts as unset. Rows with neither name attribute are skipped.
pub fn search_result_to_record(result: &SearchResult) -> Option<RawAccountRecord> {
    let identifier = result
        .get("name")
        .or_else(|| result.get("samaccountname"))?
        .clone();

    let password_changed_raw = result
        .get("pwdlastset")
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(UNSET_TIMESTAMP);

    Some(RawAccountRecord {
        identifier,
        password_changed_raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_ldap_filter() {
        assert_eq!(escape_ldap_filter("plain"), "plain");
        assert_eq!(escape_ldap_filter("a*b"), "a\\2ab");
        assert_eq!(escape_ldap_filter("Smith (Admin)"), "Smith \\28Admin\\29");
        assert_eq!(escape_ldap_filter("dom\\user"), "dom\\5cuser");
    }

    #[test]
    fn test_named_account_filter_escapes_identifier() {
        let filter = named_account_filter("j*");
        assert_eq!(
            filter,
            "(&(objectCategory=person)(objectClass=user)(|(sAMAccountName=j\\2a)(name=j\\2a)(displayName=j\\2a)))"
        );
    }

    #[test]
    fn test_search_result_to_record() {
        let row = SearchResult::new()
            .with("name", "Alice Smith")
            .with("sAMAccountName", "asmith")
            .with("pwdLastSet", "132000000000000000");
        assert_eq!(
            search_result_to_record(&row),
            Some(RawAccountRecord::new("Alice Smith", 132_000_000_000_000_000))
        );
    }

    #[test]
    fn test_missing_pwd_last_set_is_unset() {
        let row = SearchResult::new().with("sAMAccountName", "svc_sql");
        assert_eq!(
            search_result_to_record(&row),
            Some(RawAccountRecord::new("svc_sql", 0))
        );
    }

    #[test]
    fn test_row_without_name_is_skipped() {
        let row = SearchResult::new().with("pwdLastSet", "1");
        assert_eq!(search_result_to_record(&row), None);
    }

    #[test]
    fn test_row_status_only_no_more_rows_ends_search() {
        assert_eq!(row_status(0), RowStatus::Row);
        assert_eq!(row_status(S_ADS_NOMORE_ROWS as i32), RowStatus::Done);
        // server down mid-read
        assert_eq!(row_status(0x8007_203Au32 as i32), RowStatus::Failed(0x8007_203A));
        assert_eq!(row_status(0x8000_4005u32 as i32), RowStatus::Failed(0x8000_4005));
    }
}
