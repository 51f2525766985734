pub mod boundary;
pub mod rainfall;
pub mod source;
pub mod topology;

pub use boundary::*;
pub use rainfall::*;
pub use source::*;
