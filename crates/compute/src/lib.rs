pub mod resolve;
pub mod statistics;

pub use resolve::*;
pub use statistics::*;
