/*!
# DFTD map engine

The map engine turns a black and white land/sea bitmap into coastline
geometry that a renderer can draw one map segment at a time:

  - Coastlines are traced along the boundary between land and sea pixels,
    smoothed, and cut into pieces along a uniform grid of square segments.
  - Each segment knows whether it is open sea, solid land, or mixed, and
    lazily triangulates its land area when first drawn.
  - A bounding sphere tree answers coarse collision queries over triangle
    soups such as ship hulls.


## Coordinates

Map pixels and raster vertices use `y` growing _northward_, so row 0
of the raster is the southern edge of the map image. Each segment
has a local frame running from 0 to `SEGSCALE` on both axes, and
"real" coordinates are meters.


## Project status

The engine is used to load the campaign maps and draw the navigator's
chart. There is no height information yet; land is flat.
*/

#![cfg_attr(all(feature = "nightly", test), feature(test))]

extern crate dftd_grid;
extern crate nalgebra as na;
extern crate noise;
extern crate png;
extern crate rand;
extern crate rand_xoshiro;
#[macro_use]
extern crate slog;
extern crate slog_async;
extern crate slog_term;
#[macro_use]
extern crate itertools;
#[cfg(test)]
#[macro_use]
extern crate approx;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate thiserror;

#[cfg(all(feature = "nightly", test))]
extern crate test;

pub mod coast;
pub mod collision;
pub mod log;
pub mod render;
pub mod triangulate;
pub mod types;

mod error;
pub use crate::error::MapError;

// Grid types are part of our public API.
pub mod grid {
    pub use dftd_grid::*;
}
