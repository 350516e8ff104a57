use std::path::Path;

use slog::Logger;

use crate::grid::pattern::is_traceable;
use crate::grid::{GridCoord, MapPoint, RasterMap, RasterPoint, SegPos, VisitedVertices};
use crate::render::MapCanvas;
use crate::triangulate::{EarClipping, Triangulator};
use crate::types::*;
use crate::MapError;

use super::clip::divide_and_distribute_cl;
use super::contour::ContourTracer;
use super::loader::load_raster_png;
use super::segment::{CoastSegment, PointCache, SegmentGrid};
use super::smooth::CurveSmoother;
use super::spec::{City, MapDescription, MapGeometry, Topology};

/// Size in pixels of the chart view `draw_as_map` fills at zoom 1.
pub const MAP_VIEW_WIDTH: f64 = 1024.0;
pub const MAP_VIEW_HEIGHT: f64 = 768.0;

/// A rectangle of segments, clamped to the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentWindow {
    pub x: GridCoord,
    pub y: GridCoord,
    pub w: GridCoord,
    pub h: GridCoord,
}

impl SegmentWindow {
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, GridCoord)> {
        iproduct!(self.y..self.y + self.h, self.x..self.x + self.w).map(|(sy, sx)| (sx, sy))
    }
}

/// Coastlines of a whole map, cut up into a grid of segments.
///
/// Everything is computed on construction except each segment's
/// triangulation, which is built on first use and kept per detail level.
pub struct CoastMap {
    log: Logger,
    raster: RasterMap,
    geometry: MapGeometry,
    segments: SegmentGrid,
    cities: Vec<City>,
    triangulator: Box<dyn Triangulator>,
}

impl CoastMap {
    /// Load a map from its description file and the image it names.
    pub fn load(path: &Path, parent_log: &Logger) -> Result<CoastMap, MapError> {
        let log = parent_log.new(o!("map" => path.display().to_string()));
        let description = MapDescription::load(path)?;
        info!(log, "Description parsed"; "image" => &description.topology.image);

        let image_path = description.image_path(path);
        let raster = load_raster_png(&image_path)?;
        info!(log, "Map image loaded";
            "width" => raster.width(),
            "height" => raster.height());

        let mut map = CoastMap::from_raster(raster, &description.topology, &log)?;
        map.cities = description.cities;
        Ok(map)
    }

    /// Build from a raster already in memory, sizing segments
    /// to cover `MAX_SEGMENT_WIDTH_REAL` each.
    pub fn from_raster(raster: RasterMap, topology: &Topology, parent_log: &Logger) -> Result<CoastMap, MapError> {
        if topology.realwidth == 0.0 {
            return Err(MapError::ZeroRealWidth {
                path: topology.image.clone(),
            });
        }
        let geometry = MapGeometry::new(raster.width(), raster.height(), topology.realwidth, topology.real_offset())?;
        Ok(CoastMap::build(raster, geometry, parent_log))
    }

    /// Build from a raster with an explicit number of pixels per segment.
    pub fn with_segment_size(
        raster: RasterMap,
        pixels_per_seg: GridCoord,
        real_width: f64,
        real_offset: Vec2,
        parent_log: &Logger,
    ) -> Result<CoastMap, MapError> {
        let geometry =
            MapGeometry::with_segment_size(raster.width(), raster.height(), pixels_per_seg, real_width, real_offset)?;
        Ok(CoastMap::build(raster, geometry, parent_log))
    }

    fn build(raster: RasterMap, geometry: MapGeometry, parent_log: &Logger) -> CoastMap {
        let log = parent_log.new(o!());
        let mut map = CoastMap {
            log,
            raster,
            geometry,
            segments: SegmentGrid::new(geometry.segs_x, geometry.segs_y),
            cities: Vec::new(),
            triangulator: Box::new(EarClipping),
        };

        map.extract_coastlines();
        for (sy, sx) in iproduct!(0..geometry.segs_y, 0..geometry.segs_x) {
            map.process_segment(sx, sy);
        }

        info!(map.log, "Coastmap created";
            "segments" => format!("{}x{}", geometry.segs_x, geometry.segs_y),
            "pixels_per_seg" => geometry.pixels_per_seg,
            "seg_width_real" => geometry.seg_width_real);
        map
    }

    fn extract_coastlines(&mut self) {
        let mut visited = VisitedVertices::new(&self.raster);
        let tracer = ContourTracer::new(&self.raster, self.geometry.pixels_per_seg, &self.log);
        let smoother = CurveSmoother::new(self.geometry.segment_scale());

        let mut coastlines = 0;
        for (y, x) in iproduct!(0..self.raster.height(), 0..self.raster.width()) {
            let start = RasterPoint::new(x, y);
            if visited.is_visited(start) || !is_traceable(self.raster.pattern_at(start)) {
                continue;
            }
            if CoastMap::process_coastline(&tracer, &smoother, &mut visited, &mut self.segments, start) {
                coastlines += 1;
            }
        }
        info!(self.log, "Coastlines traced"; "coastlines" => coastlines);
    }

    // Trace, smooth and distribute one coastline. Returns `false`
    // if there was nothing to keep, e.g. for a lake.
    fn process_coastline(
        tracer: &ContourTracer,
        smoother: &CurveSmoother,
        visited: &mut VisitedVertices,
        segments: &mut SegmentGrid,
        start: RasterPoint,
    ) -> bool {
        let contour = match tracer.find_coastline(start, visited) {
            Some(contour) => contour,
            None => return false,
        };
        let smoothed: Vec<MapPoint> = smoother.smooth(&contour.points, contour.cyclic);
        if smoothed.len() < 2 {
            return false;
        }
        divide_and_distribute_cl(&smoothed, contour.cyclic, segments);
        true
    }

    /// Classify segment `(sx, sy)` and link up its coastline pieces.
    pub fn process_segment(&mut self, sx: GridCoord, sy: GridCoord) {
        let pps = self.geometry.pixels_per_seg;
        let land_at_corner = self.raster.is_land(sx * pps, sy * pps);
        self.segments.get_mut(sx, sy).classify(land_at_corner);
    }

    /// Replace the triangulator used for building point caches.
    /// Caches already built are kept.
    pub fn set_triangulator(&mut self, triangulator: Box<dyn Triangulator>) {
        self.triangulator = triangulator;
    }

    pub fn raster(&self) -> &RasterMap {
        &self.raster
    }

    pub fn geometry(&self) -> &MapGeometry {
        &self.geometry
    }

    pub fn segments(&self) -> &SegmentGrid {
        &self.segments
    }

    pub fn segment(&self, sx: GridCoord, sy: GridCoord) -> &CoastSegment {
        self.segments.get(sx, sy)
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn segcoord_to_real(&self, sx: GridCoord, sy: GridCoord, pos: SegPos) -> Pt2 {
        self.geometry.segcoord_to_real(sx, sy, pos)
    }

    pub fn segcoord_to_texc(&self, sx: GridCoord, sy: GridCoord, pos: SegPos) -> Pt2 {
        self.geometry.segcoord_to_texc(sx, sy, pos)
    }

    pub fn real_to_texc(&self, p: Pt2) -> Pt2 {
        self.geometry.real_to_texc(p)
    }

    /// Whether the raster cell under `p` is land. Positions off the map
    /// take the value of the nearest edge cell.
    pub fn is_land_at(&self, p: Pt2) -> bool {
        let (x, y) = self.geometry.real_to_cell(p);
        self.raster.is_land(x, y)
    }

    /// Triangulated land of segment `(sx, sy)` at `detail`, building
    /// it first if needed.
    pub fn ensure_point_cache(&mut self, sx: GridCoord, sy: GridCoord, detail: u32) -> &PointCache {
        let segment = self.segments.get_mut(sx, sy);
        segment.ensure_point_cache(&self.geometry, sx, sy, detail, self.triangulator.as_ref(), &self.log)
    }

    /// Segments visible in the chart view centred on `view_offset`,
    /// plus a margin of one segment on each side.
    pub fn visible_segments(&self, view_offset: Pt2, zoom: f64) -> SegmentWindow {
        let segw = self.geometry.seg_width_real;
        let realoff = self.geometry.real_offset;
        let w = ((MAP_VIEW_WIDTH / zoom) / segw).ceil() as GridCoord + 2;
        let h = ((MAP_VIEW_HEIGHT / zoom) / segw).ceil() as GridCoord + 2;
        let x = ((view_offset.x - realoff.x) / segw).floor() as GridCoord - w / 2;
        let y = ((view_offset.y - realoff.y) / segw).floor() as GridCoord - h / 2;

        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.geometry.segs_x);
        let y1 = (y + h).min(self.geometry.segs_y);
        SegmentWindow {
            x: x0,
            y: y0,
            w: (x1 - x0).max(0),
            h: (y1 - y0).max(0),
        }
    }

    /// Draw the chart around `view_offset`.
    ///
    /// `zoom` is pixels per meter.
    pub fn draw_as_map(&mut self, view_offset: Pt2, zoom: f64, detail: u32, canvas: &mut dyn MapCanvas) {
        let window = self.visible_segments(view_offset, zoom);
        for (sx, sy) in window.iter() {
            let segment = self.segments.get_mut(sx, sy);
            segment.draw_as_map(&self.geometry, sx, sy, detail, self.triangulator.as_ref(), &self.log, canvas);
        }
    }

    /// Draw the land around `position`, translated so that `position`
    /// is the origin.
    ///
    /// Only the segment containing `position` is drawn, at `detail + 2`.
    /// Nothing is drawn for positions off the map.
    // TODO: draw the neighboring segments too, for viewers near a segment border.
    pub fn render(&mut self, position: Pt2, detail: u32, with_terrain_top: bool, canvas: &mut dyn MapCanvas) {
        let (sx, sy) = match self.geometry.segment_at(position) {
            Some(segment) => segment,
            None => return,
        };
        let segment = self.segments.get_mut(sx, sy);
        segment.render(
            &self.geometry,
            sx,
            sy,
            position,
            detail + 2,
            with_terrain_top,
            self.triangulator.as_ref(),
            &self.log,
            canvas,
        );
    }
}
