use serde::{Deserialize, Serialize};

/// Prefix written in place of the account name when a listed account has
/// no match in the directory
pub const NOT_FOUND_PREFIX: &str = "USER NOT FOUND - ";

/// Raw `pwdLastSet` value meaning "never set" or "must change at next logon"
pub const UNSET_TIMESTAMP: i64 = 0;

/// Account name or display name as supplied by enumeration or a list file
pub type AccountIdentifier = String;

/// One account as returned by a directory lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAccountRecord {
    pub identifier: AccountIdentifier,
    /// `pwdLastSet` in FILETIME ticks; `0` is the unset sentinel
    pub password_changed_raw: i64,
}

impl RawAccountRecord {
    pub fn new(identifier: impl Into<AccountIdentifier>, password_changed_raw: i64) -> Self {
        Self {
            identifier: identifier.into(),
            password_changed_raw,
        }
    }
}

/// Result of looking up one named account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(RawAccountRecord),
    NotFound(AccountIdentifier),
}

impl LookupOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }

    /// Flatten into a report record. A miss becomes a tagged name with the
    /// unset timestamp.
    pub fn into_record(self) -> RawAccountRecord {
        match self {
            LookupOutcome::Found(record) => record,
            LookupOutcome::NotFound(identifier) => RawAccountRecord {
                identifier: format!("{}{}", NOT_FOUND_PREFIX, identifier),
                password_changed_raw: UNSET_TIMESTAMP,
            },
        }
    }
}

/// One report row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "PwdLastSet")]
    pub last_changed: String,
}

impl From<&RawAccountRecord> for NormalizedRecord {
    fn from(raw: &RawAccountRecord) -> Self {
        NormalizedRecord {
            name: raw.identifier.clone(),
            last_changed: super::normalize_timestamp(raw.password_changed_raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_outcome_is_tagged_with_unset_timestamp() {
        let record = LookupOutcome::NotFound("bob".to_string()).into_record();
        assert_eq!(record.identifier, "USER NOT FOUND - bob");
        assert_eq!(record.password_changed_raw, 0);
    }

    #[test]
    fn test_found_outcome_keeps_record() {
        let raw = RawAccountRecord::new("alice", 132_000_000_000_000_000);
        let outcome = LookupOutcome::Found(raw.clone());
        assert!(outcome.is_found());
        assert_eq!(outcome.into_record(), raw);
    }

    #[test]
    fn test_normalized_record_from_unset_raw() {
        let normalized = NormalizedRecord::from(&RawAccountRecord::new("svc_backup", 0));
        assert_eq!(normalized.name, "svc_backup");
        assert_eq!(normalized.last_changed, "0");
    }
}
