pub mod frame;
pub mod status;
pub mod stepper;
pub mod tally;

pub use frame::*;
pub use status::*;
pub use stepper::*;
pub use tally::*;
