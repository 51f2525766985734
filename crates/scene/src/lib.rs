pub mod controller;
pub mod ferns;
pub mod map;

pub use controller::{Controller, ControllerConfig};
pub use ferns::{FernConfig, FernEntity, FernField};
pub use map::{MapConfig, MapState};
