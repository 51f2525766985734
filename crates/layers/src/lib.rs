pub mod alias;
pub mod anchors;
pub mod fern;
pub mod labels;
pub mod names;
pub mod overrides;
pub mod symbology;
pub mod vector;

pub use alias::AliasTable;
pub use anchors::{Anchor, AnchorBuilder, AnchorSet};
pub use names::{NameFields, normalize};
pub use overrides::{AnchorOverride, OverrideTable};
pub use symbology::{RainStyle, style_for};
