use slog::Logger;

use crate::grid::pattern::{is_saddle, is_traceable, next_dir, Handedness};
use crate::grid::{Dir, GridCoord, RasterMap, RasterPoint, Turn, TurnCount, VisitedVertices};

/// What walking a boundary with land on the right found.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoastlineStart {
    /// The boundary closes around sea. Not traced.
    Lake,
    /// The boundary runs off the edge of the map.
    Open,
    /// The boundary closes around land.
    Island,
}

/// A traced boundary between land and sea, with land on the left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<RasterPoint>,
    /// `true` if the contour closes on itself; the first point is
    /// _not_ repeated at the end.
    pub cyclic: bool,
    /// Net quarter turns taken along the walk; right turns count positive.
    pub quarter_turns: i32,
}

impl Contour {
    /// Points where the contour changes direction.
    ///
    /// For a cyclic contour the start point counts if the walk turns there.
    pub fn corners(&self) -> Vec<RasterPoint> {
        let n = self.points.len();
        let mut corners = Vec::new();
        for i in 0..n {
            let (prev, next) = if self.cyclic {
                (self.points[(i + n - 1) % n], self.points[(i + 1) % n])
            } else if i == 0 || i + 1 == n {
                continue;
            } else {
                (self.points[i - 1], self.points[i + 1])
            };
            let here = self.points[i];
            let incoming = (here.x - prev.x, here.y - prev.y);
            let outgoing = (next.x - here.x, next.y - here.y);
            if incoming != outgoing {
                corners.push(here);
            }
        }
        corners
    }
}

/// Walks land/sea boundaries on a raster.
///
/// Tracing is done in two passes. The first walks with land on the right
/// to find a canonical starting point (and reject lakes), and the second
/// walks back with land on the left collecting points. This makes every
/// open coastline start where it enters the map, and every island start
/// on a segment grid line where possible.
pub struct ContourTracer<'a> {
    raster: &'a RasterMap,
    pixels_per_seg: GridCoord,
    log: Logger,
}

impl<'a> ContourTracer<'a> {
    pub fn new(raster: &'a RasterMap, pixels_per_seg: GridCoord, parent_log: &Logger) -> ContourTracer<'a> {
        ContourTracer {
            raster,
            pixels_per_seg,
            log: parent_log.new(o!()),
        }
    }

    /// Walk with land on the right from `start` until leaving the map or
    /// coming back around.
    ///
    /// Returns the kind of boundary and the point the real trace should
    /// start from: the last point on the map for an open boundary, or for
    /// a closed one, the last point visited that lies on a segment grid line
    /// (falling back to `start` if there was none).
    ///
    /// # Panics
    ///
    /// Panics if `start` is not on a traceable boundary.
    pub fn find_begin_of_coastline(&self, start: RasterPoint) -> (CoastlineStart, RasterPoint) {
        let mut p = start;
        let mut last_on_grid_line: Option<RasterPoint> = None;
        let mut turns = TurnCount::new();
        loop {
            let pattern = self.raster.pattern_at(p);
            if turns.last_dir().is_none() {
                assert!(!is_saddle(pattern), "Illegal start pattern {} at {:?}", pattern, p);
            }
            if is_traceable(pattern) && p.is_on_grid_line(self.pixels_per_seg) {
                last_on_grid_line = Some(p);
            }

            let dir = next_dir(pattern, turns.last_dir(), Handedness::LandRight);
            turns.step(dir);

            let next = p.step(dir);
            if !self.raster.contains_vertex(next) {
                if turns.quarter_turns().abs() > 3 {
                    warn!(self.log, "Open coastline turned a full circle";
                        "start" => format!("{:?}", start), "quarter_turns" => turns.quarter_turns());
                }
                return (CoastlineStart::Open, p);
            }
            p = next;

            if p == start {
                let begin = last_on_grid_line.unwrap_or(start);
                // Can be off by one from +/-4 if the start point is a corner.
                let kind = if turns.quarter_turns() < 0 {
                    CoastlineStart::Lake
                } else {
                    CoastlineStart::Island
                };
                return (kind, begin);
            }
        }
    }

    /// Trace the coastline through `start`, marking every point on it
    /// as visited.
    ///
    /// Returns `None` for lakes, which are left for the surrounding land
    /// to cover.
    pub fn find_coastline(&self, start: RasterPoint, visited: &mut VisitedVertices) -> Option<Contour> {
        let (kind, begin) = self.find_begin_of_coastline(start);
        if kind == CoastlineStart::Lake {
            debug!(self.log, "Skipping lake"; "start" => format!("{:?}", start));
            return None;
        }
        let cyclic = kind == CoastlineStart::Island;

        let mut points = Vec::new();
        let mut turns = TurnCount::new();
        let mut p = begin;
        loop {
            points.push(p);
            visited.mark(p);

            let pattern = self.raster.pattern_at(p);
            let dir = next_dir(pattern, turns.last_dir(), Handedness::LandLeft);
            turns.step(dir);

            let next = p.step(dir);
            if !self.raster.contains_vertex(next) || next == begin {
                break;
            }
            p = next;
        }

        // Walking with land on the left, an island is circled counterclockwise.
        if cyclic && turns.quarter_turns() > 0 {
            warn!(self.log, "Island contour circled the wrong way; dropping it";
                "begin" => format!("{:?}", begin), "quarter_turns" => turns.quarter_turns());
            return None;
        }

        trace!(self.log, "Traced coastline";
            "begin" => format!("{:?}", begin), "points" => points.len(), "cyclic" => cyclic);
        Some(Contour {
            points,
            cyclic,
            quarter_turns: turns.quarter_turns(),
        })
    }
}

/// Quarter turns needed to close a cyclic contour, i.e. the turn
/// from its last step back into its first.
pub fn closing_turn(contour: &Contour) -> i32 {
    let n = contour.points.len();
    if !contour.cyclic || n < 2 {
        return 0;
    }
    let step_dir = |from: RasterPoint, to: RasterPoint| {
        let delta = (to.x - from.x, to.y - from.y);
        crate::grid::DIRS
            .iter()
            .cloned()
            .find(|dir| dir.delta() == delta)
            .expect("Contour points are not neighbors")
    };
    let last: Dir = step_dir(contour.points[n - 1], contour.points[0]);
    let first: Dir = step_dir(contour.points[0], contour.points[1]);
    Turn::between(last, first)
        .expect("No 180 degree turns allowed!")
        .quarter_turns()
}
