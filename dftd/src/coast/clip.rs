use crate::grid::{Dir, GridCoord, MapPoint, SEGSCALE};

use super::segment::{SegCl, SegmentGrid};

// Which border a step leaves the current segment through, and how far
// along the step that happens, as the fraction `num / den`.
struct Exit {
    dir: Dir,
    num: i64,
    den: i64,
}

fn exit_border(p0: MapPoint, p1: MapPoint, lo_x: GridCoord, lo_y: GridCoord) -> Exit {
    let s = GridCoord::from(SEGSCALE);
    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;
    let x_exit = if dx > 0 {
        Some(Exit { dir: Dir::right(), num: lo_x + s - p0.x, den: dx })
    } else if dx < 0 {
        Some(Exit { dir: Dir::left(), num: p0.x - lo_x, den: -dx })
    } else {
        None
    };
    let y_exit = if dy > 0 {
        Some(Exit { dir: Dir::up(), num: lo_y + s - p0.y, den: dy })
    } else if dy < 0 {
        Some(Exit { dir: Dir::down(), num: p0.y - lo_y, den: -dy })
    } else {
        None
    };
    match (x_exit, y_exit) {
        (Some(x), Some(y)) => {
            // Earlier crossing wins; through a corner, x goes first.
            let y_first = i128::from(y.num) * i128::from(x.den) < i128::from(x.num) * i128::from(y.den);
            if y_first {
                y
            } else {
                x
            }
        }
        (Some(x), None) => x,
        (None, Some(y)) => y,
        (None, None) => panic!("Zero length step at {:?}", p0),
    }
}

// Where the step from `p0` to `p1` meets the border given by `exit`,
// snapped onto that border and kept within the segment.
fn crossing_point(p0: MapPoint, p1: MapPoint, exit: &Exit, lo_x: GridCoord, lo_y: GridCoord) -> MapPoint {
    let s = GridCoord::from(SEGSCALE);
    let t = exit.num as f64 / exit.den as f64;
    let along = |from: GridCoord, to: GridCoord, lo: GridCoord| {
        let v = (from as f64 + (to - from) as f64 * t).round() as GridCoord;
        v.max(lo).min(lo + s)
    };
    if exit.dir == Dir::right() || exit.dir == Dir::left() {
        let x = if exit.dir == Dir::right() { lo_x + s } else { lo_x };
        MapPoint::new(x, along(p0.y, p1.y, lo_y))
    } else {
        let y = if exit.dir == Dir::up() { lo_y + s } else { lo_y };
        MapPoint::new(along(p0.x, p1.x, lo_x), y)
    }
}

/// Cut a smoothed coastline along segment borders and hand each piece
/// to the segment it lies in.
///
/// Every piece but the first starts exactly on the border where the
/// previous one left, so pieces in neighboring segments meet. A closed
/// coastline that never leaves its segment becomes one cyclic piece; a
/// closed coastline that starts inside a segment and then leaves has its
/// last piece joined onto its first, so it still enters and leaves on
/// the border.
///
/// # Panics
///
/// Panics if `cl` repeats a point, or wanders off the map.
pub fn divide_and_distribute_cl(cl: &[MapPoint], cyclic: bool, segments: &mut SegmentGrid) {
    if cl.is_empty() {
        return;
    }
    let s = GridCoord::from(SEGSCALE);

    let (mut sx, mut sy) = segments.clamp(cl[0].segment());
    let mut p0 = cl[0];
    let mut segcl = SegCl::starting_at(p0.local_to(sx, sy));
    let mut held_back: Option<SegCl> = None;
    let mut left_start = false;

    let mut i = 1;
    while i < cl.len() {
        let p1 = cl[i];
        assert_ne!(p0, p1, "Double point in smoothed coastline");
        let (lo_x, lo_y) = (sx * s, sy * s);
        let inside = p1.x >= lo_x && p1.x <= lo_x + s && p1.y >= lo_y && p1.y <= lo_y + s;
        if inside {
            segcl.push_point(p1.local_to(sx, sy));
            p0 = p1;
            i += 1;
            continue;
        }

        // Leave through the border, then try the same point again
        // from the neighbor.
        let exit = exit_border(p0, p1, lo_x, lo_y);
        let crossing = if exit.num == 0 {
            p0
        } else {
            crossing_point(p0, p1, &exit, lo_x, lo_y)
        };
        let local = crossing.local_to(sx, sy);
        segcl.push_point(local);
        segcl.end_pos = local.border_pos();
        assert!(segcl.end_pos.is_some(), "Coastline left segment ({}, {}) off its border", sx, sy);

        let finished = std::mem::replace(&mut segcl, SegCl::default());
        if cyclic && !left_start && finished.begin_pos.is_none() {
            held_back = Some(finished);
        } else {
            segments.get_mut(sx, sy).push_back_segcl(finished);
        }
        left_start = true;

        let (dx, dy) = exit.dir.delta();
        sx += dx;
        sy += dy;
        assert!(
            segments.contains(sx, sy),
            "Coastline crossed the edge of the map at {:?}",
            crossing
        );
        segcl = SegCl::starting_at(crossing.local_to(sx, sy));
        p0 = crossing;
    }

    segcl.end_pos = segcl.points.last().and_then(|p| p.border_pos());
    if !left_start {
        segcl.cyclic = cyclic;
    }
    if let Some(first) = held_back {
        // Back where we started; stitch the two ends together.
        for p in first.points {
            segcl.push_point(p);
        }
        segcl.end_pos = first.end_pos;
    }
    segments.get_mut(sx, sy).push_back_segcl(segcl);
}
