//! Account collection for one report run
//!
//! Bulk modes are all-or-nothing. Named-list mode isolates every lookup:
//! a miss or a failed call becomes a `NotFound` row and the batch goes on.

use crate::domain::{AccountIdentifier, CollectionMode, CollectionResult, LookupOutcome};
use crate::error::AppResult;
use crate::infrastructure::{read_account_list, DirectoryClient};

/// Collect raw records for `mode`.
///
/// An empty result is returned as `Ok`; deciding what an empty run means is
/// left to the caller.
pub fn collect_accounts(
    mode: &CollectionMode,
    directory: &dyn DirectoryClient,
) -> AppResult<CollectionResult> {
    tracing::info!(mode = %mode, "Collecting accounts");

    let records = match mode {
        CollectionMode::AllAccounts => directory.lookup_all(None)?,
        CollectionMode::ScopedSubtree(base) => directory.lookup_all(Some(base.as_str()))?,
        CollectionMode::NamedList(path) => {
            let identifiers = read_account_list(path)?;
            let outcomes = lookup_named(&identifiers, directory);

            let missing = outcomes.iter().filter(|o| !o.is_found()).count();
            tracing::info!(
                requested = identifiers.len(),
                found = identifiers.len() - missing,
                not_found = missing,
                "Named lookups completed"
            );

            outcomes.into_iter().map(LookupOutcome::into_record).collect()
        }
    };

    tracing::info!(count = records.len(), "Collection finished");
    Ok(records)
}

/// Look up each identifier in order, one outcome per identifier
pub fn lookup_named(
    identifiers: &[AccountIdentifier],
    directory: &dyn DirectoryClient,
) -> Vec<LookupOutcome> {
    identifiers
        .iter()
        .map(|identifier| lookup_one(identifier, directory))
        .collect()
}

fn lookup_one(identifier: &str, directory: &dyn DirectoryClient) -> LookupOutcome {
    match directory.lookup_one(identifier) {
        Ok(Some(record)) => {
            tracing::debug!(identifier = identifier, raw = record.password_changed_raw, "Account found");
            LookupOutcome::Found(record)
        }
        Ok(None) => {
            tracing::warn!(identifier = identifier, "Account not found");
            LookupOutcome::NotFound(identifier.to_string())
        }
        Err(e) => {
            tracing::warn!(identifier = identifier, error = %e, "Account lookup failed, reporting as not found");
            LookupOutcome::NotFound(identifier.to_string())
        }
    }
}
