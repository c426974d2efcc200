use std::fmt;
use std::path::PathBuf;

use super::RawAccountRecord;

/// Ordered records produced by one collection run
pub type CollectionResult = Vec<RawAccountRecord>;

/// Where the accounts for a report come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionMode {
    /// Every user account in the domain
    AllAccounts,
    /// Every user account below a distinguished name
    ScopedSubtree(String),
    /// Accounts named one per line in a text file
    NamedList(PathBuf),
}

impl CollectionMode {
    /// Pick the mode from the command-line options.
    ///
    /// A user list wins over a search base; a blank search base means the
    /// whole domain.
    pub fn select(search_base: Option<&str>, user_list: Option<PathBuf>) -> Self {
        if let Some(path) = user_list {
            return CollectionMode::NamedList(path);
        }

        match search_base.map(str::trim) {
            Some(base) if !base.is_empty() => CollectionMode::ScopedSubtree(base.to_string()),
            _ => CollectionMode::AllAccounts,
        }
    }
}

impl fmt::Display for CollectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionMode::AllAccounts => write!(f, "all accounts"),
            CollectionMode::ScopedSubtree(base) => write!(f, "subtree {}", base),
            CollectionMode::NamedList(path) => write!(f, "user list {}", path.display()),
        }
    }
}
