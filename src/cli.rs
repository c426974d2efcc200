//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

use crate::commands::ReportRequest;
use crate::domain::CollectionMode;

/// Export the password-last-set time of Active Directory user accounts to CSV
#[derive(Parser, Debug)]
#[command(name = "pwdlastset-report", version, about)]
pub struct Args {
    /// CSV file to write the report to
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: String,

    /// Only report accounts below this distinguished name
    #[arg(long, short = 'b', value_name = "DN", conflicts_with = "user_list")]
    pub search_base: Option<String>,

    /// Text file with one account name per line
    #[arg(long, short = 'l', value_name = "PATH")]
    pub user_list: Option<PathBuf>,

    /// Append to an existing report instead of asking to overwrite it
    #[arg(long, short = 'a', default_value_t = false)]
    pub append: bool,

    /// Directory for PwdLastSet.log (defaults to the executable's directory)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Args {
    pub fn into_request(self) -> ReportRequest {
        ReportRequest {
            output: PathBuf::from(self.output),
            mode: CollectionMode::select(self.search_base.as_deref(), self.user_list),
            append: self.append,
        }
    }
}
