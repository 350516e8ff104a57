use std::fs;
use std::path::{Path, PathBuf};

use crate::grid::{GridCoord, SegPos, SEGSCALE};
use crate::types::*;
use crate::MapError;

/// Segments are sized so they cover at most this many meters.
pub const MAX_SEGMENT_WIDTH_REAL: f64 = 60_000.0;

// Largest power of two (exclusive) tried for pixels per segment.
const MAX_SEGMENT_EXPONENT: f64 = 62.0;

/// Where the map image lives and how it is placed in the world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    /// Path of the land/sea image, relative to the description file.
    pub image: String,
    /// Width of the whole map in meters. Must be nonzero.
    #[serde(default)]
    pub realwidth: f64,
    #[serde(default)]
    pub realoffsetx: f64,
    #[serde(default)]
    pub realoffsety: f64,
}

impl Topology {
    pub fn real_offset(&self) -> Vec2 {
        Vec2::new(self.realoffsetx, self.realoffsety)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl City {
    pub fn position(&self) -> Pt2 {
        Pt2::new(self.x, self.y)
    }
}

/// Contents of a map description file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapDescription {
    pub topology: Topology,
    #[serde(default)]
    pub cities: Vec<City>,
}

impl MapDescription {
    /// Parse a description and check it makes sense.
    ///
    /// `path` is only used to name the offending file in errors.
    pub fn from_json(json: &str, path: &Path) -> Result<MapDescription, MapError> {
        let description: MapDescription =
            serde_json::from_str(json).map_err(|source| MapError::Description {
                path: path.display().to_string(),
                source,
            })?;
        if description.topology.realwidth == 0.0 {
            return Err(MapError::ZeroRealWidth {
                path: path.display().to_string(),
            });
        }
        Ok(description)
    }

    pub fn load(path: &Path) -> Result<MapDescription, MapError> {
        let json = fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.display().to_string(),
            source,
        })?;
        MapDescription::from_json(&json, path)
    }

    /// Image path resolved against the directory holding the description.
    pub fn image_path(&self, description_path: &Path) -> PathBuf {
        match description_path.parent() {
            Some(dir) => dir.join(&self.topology.image),
            None => PathBuf::from(&self.topology.image),
        }
    }
}

/// Dimensions of a map and its segment grid, plus the mapping
/// between raster, segment and real (meter) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapGeometry {
    pub map_width: GridCoord,
    pub map_height: GridCoord,
    pub real_width: f64,
    pub real_height: f64,
    pub real_offset: Vec2,
    pub pixel_width_real: f64,
    pub pixels_per_seg: GridCoord,
    pub segs_x: GridCoord,
    pub segs_y: GridCoord,
    pub seg_width_real: f64,
}

impl MapGeometry {
    /// Pick the segment size for a map of the given pixel size:
    /// the smallest power of two number of pixels covering
    /// `MAX_SEGMENT_WIDTH_REAL` meters.
    pub fn new(
        map_width: GridCoord,
        map_height: GridCoord,
        real_width: f64,
        real_offset: Vec2,
    ) -> Result<MapGeometry, MapError> {
        let pixel_width_real = real_width / map_width as f64;
        let exponent = (MAX_SEGMENT_WIDTH_REAL / pixel_width_real).log2().ceil().max(0.0);
        // Tiny pixels ask for more pixels per segment than any map has.
        let pixels_per_seg = if exponent < MAX_SEGMENT_EXPONENT {
            1 << (exponent as u32)
        } else {
            GridCoord::max_value()
        };
        MapGeometry::with_segment_size(map_width, map_height, pixels_per_seg, real_width, real_offset)
    }

    /// Build with an explicit segment size.
    pub fn with_segment_size(
        map_width: GridCoord,
        map_height: GridCoord,
        pixels_per_seg: GridCoord,
        real_width: f64,
        real_offset: Vec2,
    ) -> Result<MapGeometry, MapError> {
        assert!(pixels_per_seg > 0, "Segments must contain at least one pixel");
        let segs_x = map_width / pixels_per_seg;
        let segs_y = map_height / pixels_per_seg;
        if segs_x == 0
            || segs_y == 0
            || segs_x * pixels_per_seg != map_width
            || segs_y * pixels_per_seg != map_height
        {
            return Err(MapError::SegmentSizeMismatch {
                width: map_width,
                height: map_height,
                pixels_per_seg,
            });
        }
        let pixel_width_real = real_width / map_width as f64;
        Ok(MapGeometry {
            map_width,
            map_height,
            real_width,
            real_height: map_height as f64 * real_width / map_width as f64,
            real_offset,
            pixel_width_real,
            pixels_per_seg,
            segs_x,
            segs_y,
            seg_width_real: pixel_width_real * pixels_per_seg as f64,
        })
    }

    pub fn segment_count(&self) -> usize {
        (self.segs_x * self.segs_y) as usize
    }

    /// Factor from raster vertex coordinates to map-wide segment-scaled ones.
    pub fn segment_scale(&self) -> f64 {
        f64::from(SEGSCALE) / self.pixels_per_seg as f64
    }

    /// Real position of the bottom left corner of segment `(sx, sy)`.
    pub fn segment_origin(&self, sx: GridCoord, sy: GridCoord) -> Pt2 {
        Pt2::new(
            sx as f64 * self.seg_width_real + self.real_offset.x,
            sy as f64 * self.seg_width_real + self.real_offset.y,
        )
    }

    pub fn segcoord_to_real(&self, sx: GridCoord, sy: GridCoord, pos: SegPos) -> Pt2 {
        let s = f64::from(SEGSCALE);
        let x = sx as f64 + f64::from(pos.x) / s;
        let y = sy as f64 + f64::from(pos.y) / s;
        Pt2::new(x * self.seg_width_real, y * self.seg_width_real) + self.real_offset
    }

    /// Texture coordinates of a segment point, for a texture covering the
    /// whole map with its first row at the north edge.
    pub fn segcoord_to_texc(&self, sx: GridCoord, sy: GridCoord, pos: SegPos) -> Pt2 {
        let s = f64::from(SEGSCALE);
        Pt2::new(
            (sx as f64 * s + f64::from(pos.x)) / (self.segs_x as f64 * s),
            1.0 - (sy as f64 * s + f64::from(pos.y)) / (self.segs_y as f64 * s),
        )
    }

    pub fn real_to_texc(&self, p: Pt2) -> Pt2 {
        Pt2::new(
            (p.x - self.real_offset.x) / self.real_width,
            1.0 - (p.y - self.real_offset.y) / self.real_height,
        )
    }

    /// Raster cell containing the real position `p`. May lie outside the map.
    pub fn real_to_cell(&self, p: Pt2) -> (GridCoord, GridCoord) {
        let local = p - self.real_offset;
        (
            (local.x / self.pixel_width_real).floor() as GridCoord,
            (local.y / self.pixel_width_real).floor() as GridCoord,
        )
    }

    /// Segment containing the real position `p`, if any.
    pub fn segment_at(&self, p: Pt2) -> Option<(GridCoord, GridCoord)> {
        let local = p - self.real_offset;
        let sx = (local.x / self.seg_width_real).floor();
        let sy = (local.y / self.seg_width_real).floor();
        if sx < 0.0 || sy < 0.0 || sx >= self.segs_x as f64 || sy >= self.segs_y as f64 {
            return None;
        }
        Some((sx as GridCoord, sy as GridCoord))
    }
}
