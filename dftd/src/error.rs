use std::io;

use thiserror::Error;

use crate::grid::{GridCoord, RasterError};

/// Failures loading a map from its description and image.
///
/// These are all problems with the map data on disk. Bugs in the
/// coastline code itself still panic.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("could not read {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("malformed map description {path}: {source}")]
    Description {
        path: String,
        source: serde_json::Error,
    },
    #[error("realwidth not given or zero in {path}")]
    ZeroRealWidth { path: String },
    #[error("could not decode map image {path}: {source}")]
    Image {
        path: String,
        source: png::DecodingError,
    },
    #[error("map image {path} is not a black/white two colour palette image: {reason}")]
    NotTwoColour { path: String, reason: String },
    #[error(
        "map size {width}x{height} must be an integer multiple of the segment size {pixels_per_seg}"
    )]
    SegmentSizeMismatch {
        width: GridCoord,
        height: GridCoord,
        pixels_per_seg: GridCoord,
    },
    #[error(transparent)]
    Raster(#[from] RasterError),
}
