//! Directory lookup capability consumed by the collector

use super::ad_connection::AdConnection;
use super::ad_search::{
    ldap_search, named_account_filter, search_result_to_record, ACCOUNT_ATTRIBUTES, USER_ACCOUNT_FILTER,
};
use crate::domain::RawAccountRecord;
use crate::error::{AppError, AppResult};

/// Read access to account password metadata
pub trait DirectoryClient {
    /// Every user account in `scope_base`, or the whole domain when `None`.
    ///
    /// Fails as a unit: an error means no records are usable.
    fn lookup_all(&self, scope_base: Option<&str>) -> AppResult<Vec<RawAccountRecord>>;

    /// One account by logon name, name, or display name. `Ok(None)` is a miss.
    fn lookup_one(&self, identifier: &str) -> AppResult<Option<RawAccountRecord>>;
}

/// Active Directory over ADSI with the current user's credentials
pub struct AdDirectory {
    connection: AdConnection,
}

impl AdDirectory {
    pub fn connect() -> AppResult<Self> {
        Ok(Self {
            connection: AdConnection::connect()?,
        })
    }
}

impl DirectoryClient for AdDirectory {
    fn lookup_all(&self, scope_base: Option<&str>) -> AppResult<Vec<RawAccountRecord>> {
        let base_dn = scope_base.unwrap_or(&self.connection.domain_dn);

        let results = ldap_search(base_dn, USER_ACCOUNT_FILTER, &ACCOUNT_ATTRIBUTES)
            .map_err(|e| match e {
                AppError::BulkLookup(_) => e,
                other => AppError::BulkLookup(other.to_string()),
            })?;

        Ok(results.iter().filter_map(search_result_to_record).collect())
    }

    fn lookup_one(&self, identifier: &str) -> AppResult<Option<RawAccountRecord>> {
        let filter = named_account_filter(identifier);
        let results = ldap_search(&self.connection.domain_dn, &filter, &ACCOUNT_ATTRIBUTES)?;

        if results.len() > 1 {
            tracing::warn!(
                identifier = identifier,
                matches = results.len(),
                "Identifier matched several accounts, using the first"
            );
        }

        Ok(results.first().and_then(search_result_to_record))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    /// In-memory directory keyed by account name
    #[derive(Default)]
    pub struct InMemoryDirectory {
        accounts: Vec<RawAccountRecord>,
        failing: HashMap<String, String>,
        offline: bool,
        pub lookups: Cell<usize>,
    }

    impl InMemoryDirectory {
        pub fn with_accounts(accounts: &[(&str, i64)]) -> Self {
            Self {
                accounts: accounts
                    .iter()
                    .map(|(name, raw)| RawAccountRecord::new(*name, *raw))
                    .collect(),
                ..Self::default()
            }
        }

        /// Make every lookup fail as if the service were unreachable
        pub fn offline() -> Self {
            Self {
                offline: true,
                ..Self::default()
            }
        }

        /// Make lookups of one identifier fail with an error
        pub fn failing_on(mut self, identifier: &str) -> Self {
            self.failing
                .insert(identifier.to_string(), "server busy".to_string());
            self
        }
    }

    impl DirectoryClient for InMemoryDirectory {
        fn lookup_all(&self, _scope_base: Option<&str>) -> AppResult<Vec<RawAccountRecord>> {
            self.lookups.set(self.lookups.get() + 1);
            if self.offline {
                return Err(AppError::BulkLookup("server unreachable".to_string()));
            }
            Ok(self.accounts.clone())
        }

        fn lookup_one(&self, identifier: &str) -> AppResult<Option<RawAccountRecord>> {
            self.lookups.set(self.lookups.get() + 1);
            if self.offline {
                return Err(AppError::BulkLookup("server unreachable".to_string()));
            }
            if let Some(reason) = self.failing.get(identifier) {
                return Err(AppError::BulkLookup(reason.clone()));
            }
            Ok(self
                .accounts
                .iter()
                .find(|a| a.identifier.eq_ignore_ascii_case(identifier))
                .cloned())
        }
    }
}
