pub mod collect;
pub mod report;

pub use collect::*;
pub use report::*;
