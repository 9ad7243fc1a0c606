//! Alpha trimming. Crops RGBA8 bitmaps to the region holding non-transparent pixels.

mod bbox;
mod extract;

pub use bbox::{BBox, bounds_of, find_opaque_bounds};
pub use extract::{extract, trim};
