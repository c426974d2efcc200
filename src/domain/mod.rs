pub mod account;
pub mod collection;
pub mod timestamp;

pub use account::*;
pub use collection::*;
pub use timestamp::*;
