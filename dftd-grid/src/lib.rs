#[macro_use]
extern crate serde_derive;
#[cfg(test)]
#[macro_use]
extern crate itertools;

mod dir;
pub mod pattern;
mod raster;
mod raster_point;
mod seg_pos;
mod turn;

pub use self::dir::*;
pub use self::pattern::Pattern;
pub use self::raster::*;
pub use self::raster_point::RasterPoint;
pub use self::seg_pos::*;
pub use self::turn::*;

// Raster vertex coordinates and map-wide segment-scaled coordinates
// share this type; the latter need more than 32 bits on big maps.
pub type GridCoord = i64;
