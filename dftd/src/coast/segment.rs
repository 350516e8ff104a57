use slog::Logger;

use crate::grid::{BorderPos, GridCoord, SegPos, BORDER_LENGTH, SEGSCALE};
use crate::na;
use crate::render::{MapCanvas, MapVertex};
use crate::triangulate::{signed_area2, Triangulator};
use crate::types::*;

use super::spec::MapGeometry;

/// Consecutive polygon points closer than this (squared, in meters)
/// are merged before triangulating.
const MIN_POINT_DIST_SQ: f64 = 0.1;

/// Relative difference between triangulated and polygon area that
/// counts as a bad triangulation.
const AREA_TOLERANCE: f64 = 1e-6;

/// The part of one coastline that falls within a single segment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SegCl {
    pub points: Vec<SegPos>,
    /// Where the piece enters the segment, if it starts on the border.
    pub begin_pos: Option<BorderPos>,
    /// Where the piece leaves the segment, if it ends on the border.
    pub end_pos: Option<BorderPos>,
    /// Closes on itself without ever leaving the segment.
    pub cyclic: bool,
    /// Index of the piece that continues the land boundary
    /// counterclockwise after this one leaves.
    pub next: Option<usize>,
}

impl SegCl {
    pub fn starting_at(p: SegPos) -> SegCl {
        SegCl {
            points: vec![p],
            begin_pos: p.border_pos(),
            ..SegCl::default()
        }
    }

    /// Append `p` unless it repeats the last point.
    pub fn push_point(&mut self, p: SegPos) {
        if self.points.last() != Some(&p) {
            self.points.push(p);
        }
    }
}

/// What fills a segment.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SegmentType {
    Sea = 0,
    Land = 1,
    /// Has coastline running through it.
    Mixed = 2,
}

/// One closed land polygon, triangulated.
#[derive(Clone, Debug, Default)]
pub struct CacheEntry {
    pub points: Vec<Pt2>,
    pub indices: Vec<u32>,
}

impl CacheEntry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Triangulated land polygons of a segment, built for one detail level.
#[derive(Clone, Debug, Default)]
pub struct PointCache {
    pub detail: u32,
    pub entries: Vec<CacheEntry>,
}

impl PointCache {
    pub fn triangle_count(&self) -> usize {
        self.entries.iter().map(CacheEntry::triangle_count).sum()
    }
}

/// One cell of the map's segment grid.
#[derive(Debug)]
pub struct CoastSegment {
    segcls: Vec<SegCl>,
    kind: SegmentType,
    point_cache: Option<PointCache>,
}

impl Default for CoastSegment {
    fn default() -> CoastSegment {
        CoastSegment::new()
    }
}

impl CoastSegment {
    pub fn new() -> CoastSegment {
        CoastSegment {
            segcls: Vec::new(),
            kind: SegmentType::Sea,
            point_cache: None,
        }
    }

    pub fn kind(&self) -> SegmentType {
        self.kind
    }

    pub fn segcls(&self) -> &[SegCl] {
        &self.segcls
    }

    /// The point cache, if one has been built.
    pub fn point_cache(&self) -> Option<&PointCache> {
        self.point_cache.as_ref()
    }

    /// Add a coastline piece. Pieces with fewer than two points are
    /// left over from clipping exactly through a corner, and are dropped.
    ///
    /// A cyclic piece is made its own successor.
    ///
    /// # Panics
    ///
    /// Panics if a piece that doesn't close on itself fails to start
    /// or end on the segment border.
    pub fn push_back_segcl(&mut self, mut segcl: SegCl) {
        if !segcl.cyclic {
            assert!(
                segcl.begin_pos.is_some() && segcl.end_pos.is_some(),
                "Open coastline piece must start and end on the segment border: {:?}",
                segcl
            );
        }
        if segcl.points.len() < 2 {
            return;
        }
        if segcl.cyclic {
            segcl.next = Some(self.segcls.len());
        }
        self.segcls.push(segcl);
    }

    /// Link piece `i` to the piece that continues the land boundary
    /// after `i` leaves the segment.
    ///
    /// Normally that's the piece whose entry point comes first going
    /// counterclockwise around the border from where `i` leaves. Exits
    /// and entries sharing a border point are ordered so that exits and
    /// entries alternate around the border; see `match_border_crossings`.
    ///
    /// A piece may be its own successor. Does nothing if `i` is already linked.
    pub fn compute_successor_for_cl(&mut self, i: usize) {
        if self.segcls[i].next.is_some() {
            return;
        }
        assert!(
            self.segcls[i].end_pos.is_some(),
            "Coastline piece {} has no exit but isn't cyclic",
            i
        );
        let next = match_border_crossings(&self.segcls)[i];
        assert!(next.is_some(), "No successor found for coastline piece {}", i);
        self.segcls[i].next = next;
    }

    /// Decide what fills the segment. `land_at_corner` is the raster value
    /// at the segment's bottom left pixel, which decides segments without
    /// any coastline.
    ///
    /// # Panics
    ///
    /// Panics if the successor links don't visit every piece exactly once.
    pub fn classify(&mut self, land_at_corner: bool) {
        if self.segcls.is_empty() {
            self.kind = if land_at_corner {
                SegmentType::Land
            } else {
                SegmentType::Sea
            };
        } else {
            self.kind = SegmentType::Mixed;
            let matching = match_border_crossings(&self.segcls);
            for (segcl, next) in self.segcls.iter_mut().zip(matching) {
                if segcl.next.is_none() {
                    segcl.next = next;
                }
            }
            self.assert_successors_permute();
        }
        self.point_cache = None;
    }

    fn assert_successors_permute(&self) {
        let mut taken = vec![false; self.segcls.len()];
        for (i, segcl) in self.segcls.iter().enumerate() {
            let next = segcl
                .next
                .unwrap_or_else(|| panic!("Successor of coastline piece {} unset", i));
            assert!(
                !taken[next],
                "Coastline piece {} is the successor of more than one piece",
                next
            );
            taken[next] = true;
        }
    }

    /// Build the triangulated point cache for `detail` unless it is
    /// already built for that level, and return it.
    ///
    /// Only mixed segments have anything in their cache.
    pub fn ensure_point_cache(
        &mut self,
        geometry: &MapGeometry,
        sx: GridCoord,
        sy: GridCoord,
        detail: u32,
        triangulator: &dyn Triangulator,
        log: &Logger,
    ) -> &PointCache {
        let up_to_date = self.point_cache.as_ref().map_or(false, |cache| cache.detail == detail);
        if !up_to_date {
            self.point_cache = None;
        }
        let segcls = &self.segcls;
        let kind = self.kind;
        self.point_cache.get_or_insert_with(|| {
            let entries = if kind == SegmentType::Mixed {
                build_cache_entries(segcls, geometry, sx, sy, triangulator, log)
            } else {
                Vec::new()
            };
            PointCache { detail, entries }
        })
    }

    /// Draw the segment on the chart: a textured quad if it's all land,
    /// its land polygons if mixed, and nothing for open sea.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_as_map(
        &mut self,
        geometry: &MapGeometry,
        sx: GridCoord,
        sy: GridCoord,
        detail: u32,
        triangulator: &dyn Triangulator,
        log: &Logger,
        canvas: &mut dyn MapCanvas,
    ) {
        match self.kind {
            SegmentType::Sea => {}
            SegmentType::Land => {
                canvas.draw_quad(&land_quad(geometry, sx, sy, Vec2::zeros()));
            }
            SegmentType::Mixed => {
                let cache = self.ensure_point_cache(geometry, sx, sy, detail, triangulator, log);
                draw_cache(geometry, cache, Vec2::zeros(), canvas);
            }
        }
    }

    /// Draw the segment relative to `viewer`.
    ///
    /// With `with_terrain_top` this draws the land surface. Otherwise
    /// it only draws the coastline pieces as line strips.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        geometry: &MapGeometry,
        sx: GridCoord,
        sy: GridCoord,
        viewer: Pt2,
        detail: u32,
        with_terrain_top: bool,
        triangulator: &dyn Triangulator,
        log: &Logger,
        canvas: &mut dyn MapCanvas,
    ) {
        let shift = -viewer.coords;
        if with_terrain_top {
            match self.kind {
                SegmentType::Sea => {}
                SegmentType::Land => canvas.draw_quad(&land_quad(geometry, sx, sy, shift)),
                SegmentType::Mixed => {
                    let cache = self.ensure_point_cache(geometry, sx, sy, detail, triangulator, log);
                    draw_cache(geometry, cache, shift, canvas);
                }
            }
        } else {
            for segcl in &self.segcls {
                let strip: Vec<Pt2> = segcl
                    .points
                    .iter()
                    .map(|p| geometry.segcoord_to_real(sx, sy, *p) + shift)
                    .collect();
                canvas.draw_line_strip(&strip);
            }
        }
    }
}

fn land_quad(geometry: &MapGeometry, sx: GridCoord, sy: GridCoord, shift: Vec2) -> [MapVertex; 4] {
    let s = SEGSCALE as u16;
    let origin = geometry.segment_origin(sx, sy) + shift;
    let w = geometry.seg_width_real;
    let tc0 = geometry.segcoord_to_texc(sx, sy, SegPos::new(0, 0));
    let tc1 = geometry.segcoord_to_texc(sx, sy, SegPos::new(s, s));
    [
        MapVertex::new(origin, Pt2::new(tc0.x, tc0.y)),
        MapVertex::new(origin + Vec2::new(w, 0.0), Pt2::new(tc1.x, tc0.y)),
        MapVertex::new(origin + Vec2::new(w, w), Pt2::new(tc1.x, tc1.y)),
        MapVertex::new(origin + Vec2::new(0.0, w), Pt2::new(tc0.x, tc1.y)),
    ]
}

fn draw_cache(geometry: &MapGeometry, cache: &PointCache, shift: Vec2, canvas: &mut dyn MapCanvas) {
    for entry in &cache.entries {
        let vertices: Vec<MapVertex> = entry
            .points
            .iter()
            .map(|p| MapVertex::new(*p + shift, geometry.real_to_texc(*p)))
            .collect();
        canvas.draw_triangles(&vertices, &entry.indices);
    }
}

// Follow every successor chain once, emitting one closed land
// polygon per chain.
fn build_cache_entries(
    segcls: &[SegCl],
    geometry: &MapGeometry,
    sx: GridCoord,
    sy: GridCoord,
    triangulator: &dyn Triangulator,
    log: &Logger,
) -> Vec<CacheEntry> {
    let origin = geometry.segment_origin(sx, sy);
    let w = geometry.seg_width_real;
    let corners = [
        origin,
        origin + Vec2::new(w, 0.0),
        origin + Vec2::new(w, w),
        origin + Vec2::new(0.0, w),
    ];

    let mut entries = Vec::new();
    let mut handled = vec![false; segcls.len()];
    for i in 0..segcls.len() {
        if handled[i] {
            continue;
        }

        let mut points: Vec<Pt2> = Vec::new();
        let mut current = i;
        loop {
            assert!(
                !handled[current],
                "Illegal successor chain in segment ({}, {}) at piece {}",
                sx,
                sy,
                current
            );
            handled[current] = true;
            let segcl = &segcls[current];
            points.extend(segcl.points.iter().map(|p| geometry.segcoord_to_real(sx, sy, *p)));

            let next = segcl
                .next
                .unwrap_or_else(|| panic!("Successor of piece {} in segment ({}, {}) unset", current, sx, sy));
            if !segcl.cyclic {
                // Walk the border counterclockwise to where the next piece
                // enters, picking up every corner on the way.
                let b0 = segcl.end_pos.expect("Open piece without exit");
                let b1 = segcls[next].begin_pos.expect("Open piece without entry");
                points.extend(corners_between(b0, b1).map(|j| corners[j]));
            }
            current = next;
            if current == i {
                break;
            }
        }

        let mut cleaned: Vec<Pt2> = Vec::with_capacity(points.len());
        for p in points {
            let far_enough = cleaned
                .last()
                .map_or(true, |q| na::distance_squared(q, &p) >= MIN_POINT_DIST_SQ);
            if far_enough {
                cleaned.push(p);
            }
        }
        while cleaned.len() > 1 && na::distance_squared(&cleaned[0], &cleaned[cleaned.len() - 1]) < MIN_POINT_DIST_SQ {
            cleaned.pop();
        }
        if cleaned.len() < 3 {
            debug!(log, "Dropping degenerate land polygon"; "segment" => format!("({}, {})", sx, sy), "points" => cleaned.len());
            continue;
        }

        let indices = triangulator.compute(&cleaned);
        if indices.len() / 3 + 2 < cleaned.len() {
            warn!(log, "Triangulation did not consume the whole polygon";
                "segment" => format!("({}, {})", sx, sy),
                "points" => cleaned.len(),
                "triangles" => indices.len() / 3);
        }
        if !covers_polygon_exactly(&cleaned, &indices) {
            warn!(log, "Triangulation area differs from polygon area";
                "segment" => format!("({}, {})", sx, sy),
                "polygon_area" => signed_area2(&cleaned).abs() / 2.0,
                "triangles_area" => triangles_area2(&cleaned, &indices) / 2.0);
        }
        entries.push(CacheEntry {
            points: cleaned,
            indices,
        });
    }
    entries
}

// Grid corners passed going counterclockwise around the border from `b0`
// to `b1`, as indices into bottom left, bottom right, top right, top left.
fn corners_between(b0: BorderPos, b1: BorderPos) -> impl Iterator<Item = usize> {
    let b1 = if b1 < b0 { b1 + BORDER_LENGTH } else { b1 };
    let first_corner = (b0 + SEGSCALE - 1) / SEGSCALE;
    let last_corner = b1 / SEGSCALE;
    (first_corner..=last_corner).map(|j| (j % 4) as usize)
}

// Sum of the doubled areas of the triangles in `indices`, ignoring winding.
fn triangles_area2(points: &[Pt2], indices: &[u32]) -> Real {
    indices
        .chunks(3)
        .filter(|tri| tri.len() == 3)
        .map(|tri| {
            let a = points[tri[0] as usize];
            let b = points[tri[1] as usize];
            let c = points[tri[2] as usize];
            ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)).abs()
        })
        .sum()
}

// Whether the triangles cover as much area as the polygon encloses.
// Self-intersecting outlines give overlapping triangles, or too few.
fn covers_polygon_exactly(points: &[Pt2], indices: &[u32]) -> bool {
    let polygon_area = signed_area2(points).abs();
    (triangles_area2(points, indices) - polygon_area).abs() <= polygon_area * AREA_TOLERANCE
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Crossing {
    Enter(usize),
    Leave(usize),
}

/// Successor of every open piece in `segcls`; `None` for cyclic pieces.
///
/// Going counterclockwise around the border, exits and entries of the
/// pieces alternate, and each exit is followed by the entry of its
/// successor. Crossings that share a border point are ordered to keep
/// that alternation. If that still leaves more than one way to order
/// them, the one whose land polygons all wind counterclockwise wins.
fn match_border_crossings(segcls: &[SegCl]) -> Vec<Option<usize>> {
    let mut crossings: Vec<(BorderPos, Crossing)> = Vec::new();
    for (i, segcl) in segcls.iter().enumerate().filter(|(_, segcl)| !segcl.cyclic) {
        if let (Some(begin), Some(end)) = (segcl.begin_pos, segcl.end_pos) {
            crossings.push((begin, Crossing::Enter(i)));
            crossings.push((end, Crossing::Leave(i)));
        }
    }
    crossings.sort();

    // Runs of crossings on the same border point.
    let mut groups: Vec<&[(BorderPos, Crossing)]> = Vec::new();
    let mut rest = &crossings[..];
    while let Some(&(pos, _)) = rest.first() {
        let len = rest.iter().take_while(|&&(p, _)| p == pos).count();
        groups.push(&rest[..len]);
        rest = &rest[len..];
    }

    let mut candidates: Vec<Vec<Option<usize>>> = Vec::new();
    for (start, leave_first) in iproduct!(0..groups.len(), [true, false].iter().cloned()) {
        let order = match alternating_order(&groups, start, leave_first) {
            Some(order) => order,
            None => continue,
        };
        let mut next = vec![None; segcls.len()];
        for (k, crossing) in order.iter().enumerate() {
            if let (Crossing::Leave(i), Crossing::Enter(j)) = (*crossing, order[(k + 1) % order.len()]) {
                next[i] = Some(j);
            }
        }
        if !candidates.contains(&next) {
            candidates.push(next);
        }
    }

    match candidates.len() {
        0 => nearest_free_entries(segcls, &crossings),
        1 => candidates.swap_remove(0),
        _ => {
            let ccw = candidates.iter().position(|next| all_chains_counterclockwise(segcls, next));
            candidates.swap_remove(ccw.unwrap_or(0))
        }
    }
}

// The crossings in border order starting at group `start`, with the
// crossings inside each group arranged to alternate between exits and
// entries. `None` if no such arrangement exists.
fn alternating_order(groups: &[&[(BorderPos, Crossing)]], start: usize, leave_first: bool) -> Option<Vec<Crossing>> {
    let mut order = Vec::new();
    let mut want_leave = leave_first;
    for g in 0..groups.len() {
        let group = groups[(start + g) % groups.len()];
        let mut leaves = group.iter().filter(|(_, c)| matches!(c, Crossing::Leave(_))).map(|&(_, c)| c);
        let mut enters = group.iter().filter(|(_, c)| matches!(c, Crossing::Enter(_))).map(|&(_, c)| c);
        for _ in 0..group.len() {
            let crossing = if want_leave { leaves.next() } else { enters.next() };
            order.push(crossing?);
            want_leave = !want_leave;
        }
    }
    // Has to close up: the last crossing is followed by the first.
    if want_leave == leave_first {
        Some(order)
    } else {
        None
    }
}

// Last resort for crossings that can't be made to alternate: each exit
// takes the nearest entry counterclockwise that no other exit has taken.
fn nearest_free_entries(segcls: &[SegCl], crossings: &[(BorderPos, Crossing)]) -> Vec<Option<usize>> {
    let mut next = vec![None; segcls.len()];
    let mut taken = vec![false; segcls.len()];
    for (k, &(_, crossing)) in crossings.iter().enumerate() {
        let i = match crossing {
            Crossing::Leave(i) => i,
            Crossing::Enter(_) => continue,
        };
        for step in 1..=crossings.len() {
            if let Crossing::Enter(j) = crossings[(k + step) % crossings.len()].1 {
                if !taken[j] {
                    taken[j] = true;
                    next[i] = Some(j);
                    break;
                }
            }
        }
    }
    next
}

// Whether every land polygon the links in `next` describe winds
// counterclockwise, measured in segment-local coordinates.
fn all_chains_counterclockwise(segcls: &[SegCl], next: &[Option<usize>]) -> bool {
    let s = Real::from(SEGSCALE);
    let corners = [Pt2::new(0.0, 0.0), Pt2::new(s, 0.0), Pt2::new(s, s), Pt2::new(0.0, s)];
    let mut handled = vec![false; segcls.len()];
    for i in 0..segcls.len() {
        if handled[i] || next[i].is_none() {
            continue;
        }
        let mut points: Vec<Pt2> = Vec::new();
        let mut current = i;
        loop {
            if handled[current] {
                return false;
            }
            handled[current] = true;
            let segcl = &segcls[current];
            points.extend(segcl.points.iter().map(|p| Pt2::new(Real::from(p.x), Real::from(p.y))));
            let following = match next[current] {
                Some(following) => following,
                None => return false,
            };
            if let (Some(b0), Some(b1)) = (segcl.end_pos, segcls[following].begin_pos) {
                points.extend(corners_between(b0, b1).map(|j| corners[j]));
            }
            current = following;
            if current == i {
                break;
            }
        }
        if signed_area2(&points) <= 0.0 {
            return false;
        }
    }
    true
}

/// The map's grid of segments, row by row from the south.
#[derive(Debug)]
pub struct SegmentGrid {
    segs_x: GridCoord,
    segs_y: GridCoord,
    segments: Vec<CoastSegment>,
}

impl SegmentGrid {
    pub fn new(segs_x: GridCoord, segs_y: GridCoord) -> SegmentGrid {
        SegmentGrid {
            segs_x,
            segs_y,
            segments: (0..segs_x * segs_y).map(|_| CoastSegment::new()).collect(),
        }
    }

    pub fn segs_x(&self) -> GridCoord {
        self.segs_x
    }

    pub fn segs_y(&self) -> GridCoord {
        self.segs_y
    }

    pub fn contains(&self, sx: GridCoord, sy: GridCoord) -> bool {
        sx >= 0 && sy >= 0 && sx < self.segs_x && sy < self.segs_y
    }

    /// Pull a segment coordinate into the grid. Points on the far edges of
    /// the map belong to the last row or column.
    pub fn clamp(&self, (sx, sy): (GridCoord, GridCoord)) -> (GridCoord, GridCoord) {
        (sx.max(0).min(self.segs_x - 1), sy.max(0).min(self.segs_y - 1))
    }

    fn index(&self, sx: GridCoord, sy: GridCoord) -> usize {
        assert!(self.contains(sx, sy), "Segment ({}, {}) is outside the map", sx, sy);
        (sy * self.segs_x + sx) as usize
    }

    pub fn get(&self, sx: GridCoord, sy: GridCoord) -> &CoastSegment {
        &self.segments[self.index(sx, sy)]
    }

    pub fn get_mut(&mut self, sx: GridCoord, sy: GridCoord) -> &mut CoastSegment {
        let i = self.index(sx, sy);
        &mut self.segments[i]
    }

    /// All segments with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = ((GridCoord, GridCoord), &CoastSegment)> {
        let segs_x = self.segs_x;
        self.segments
            .iter()
            .enumerate()
            .map(move |(i, segment)| ((i as GridCoord % segs_x, i as GridCoord / segs_x), segment))
    }
}
