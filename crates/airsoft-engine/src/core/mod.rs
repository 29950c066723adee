pub use self::{actor::*, effects::*, geometry::*, map::*};

pub(crate) mod actor;
pub(crate) mod effects;
pub mod geometry;
pub(crate) mod map;
