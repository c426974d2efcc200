pub mod account_list;
pub mod ad_connection;
pub mod ad_search;
pub mod directory;
pub mod file_guard;
pub mod prompt;
pub mod report_writer;

pub use account_list::*;
pub use ad_connection::*;
pub use ad_search::*;
pub use directory::*;
pub use file_guard::*;
pub use prompt::*;
pub use report_writer::*;
