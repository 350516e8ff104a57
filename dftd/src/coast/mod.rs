//! Coastline extraction.
//!
//! Building a `CoastMap` runs the whole pipeline: every land/sea boundary
//! in the raster is traced into a contour, smoothed into a curve, and cut
//! along segment borders into pieces that each segment links up into
//! closed land polygons.

mod clip;
mod coast_map;
mod contour;
mod gen;
mod loader;
mod segment;
mod smooth;
mod spec;

#[cfg(test)]
mod tests;

pub use self::clip::divide_and_distribute_cl;
pub use self::coast_map::{CoastMap, SegmentWindow, MAP_VIEW_HEIGHT, MAP_VIEW_WIDTH};
pub use self::contour::{closing_turn, CoastlineStart, Contour, ContourTracer};
pub use self::gen::RasterGen;
pub use self::loader::{decode_raster_png, load_raster_png};
pub use self::segment::{CacheEntry, CoastSegment, PointCache, SegCl, SegmentGrid, SegmentType};
pub use self::smooth::{BSpline, CurveSmoother, BSPLINE_DETAIL, BSPLINE_SMOOTH_FACTOR};
pub use self::spec::{City, MapDescription, MapGeometry, Topology, MAX_SEGMENT_WIDTH_REAL};
