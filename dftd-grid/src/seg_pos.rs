use super::GridCoord;

/// Side length of a map segment in segment-local units.
pub const SEGSCALE: u32 = 65535;

/// Position along a segment's perimeter, counterclockwise from the
/// bottom left corner: bottom edge, right edge, top edge, left edge.
pub type BorderPos = u32;

/// Total perimeter length; border positions lie in `[0, BORDER_LENGTH)`.
pub const BORDER_LENGTH: BorderPos = 4 * SEGSCALE;

/// A point in one segment's local frame, `[0, SEGSCALE]` on both axes.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct SegPos {
    pub x: u16,
    pub y: u16,
}

impl SegPos {
    pub fn new(x: u16, y: u16) -> SegPos {
        SegPos { x, y }
    }

    /// Corner `index` of the segment, counting counterclockwise
    /// from the bottom left. Its border position is `index * SEGSCALE`.
    pub fn corner(index: u8) -> SegPos {
        let s = SEGSCALE as u16;
        match index % 4 {
            0 => SegPos::new(0, 0),
            1 => SegPos::new(s, 0),
            2 => SegPos::new(s, s),
            _ => SegPos::new(0, s),
        }
    }

    /// Where along the perimeter this point lies, or `None` if it is
    /// strictly inside the segment.
    ///
    /// Corners belong to the edge that starts there, so `(SEGSCALE, 0)`
    /// maps to `SEGSCALE` rather than the end of the bottom edge.
    pub fn border_pos(self) -> Option<BorderPos> {
        let s = SEGSCALE;
        let (x, y) = (u32::from(self.x), u32::from(self.y));
        if y == 0 {
            Some(x)
        } else if x == s {
            Some(s + y)
        } else if y == s {
            Some(3 * s - x)
        } else if x == 0 {
            Some(4 * s - y)
        } else {
            None
        }
    }

    /// Inverse of `border_pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is not less than `BORDER_LENGTH`.
    pub fn from_border_pos(pos: BorderPos) -> SegPos {
        assert!(pos < BORDER_LENGTH, "Border position {} out of range", pos);
        let s = SEGSCALE;
        let (x, y) = if pos < s {
            (pos, 0)
        } else if pos < 2 * s {
            (s, pos - s)
        } else if pos < 3 * s {
            (3 * s - pos, s)
        } else {
            (0, 4 * s - pos)
        };
        SegPos::new(x as u16, y as u16)
    }

    pub fn is_on_border(self) -> bool {
        self.border_pos().is_some()
    }

    pub fn dist_sq(self, other: SegPos) -> u64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        (dx * dx + dy * dy) as u64
    }
}

/// A point in map-wide segment-scaled coordinates.
///
/// Segment `(sx, sy)` covers `[sx * SEGSCALE, (sx + 1) * SEGSCALE]` on the
/// x axis, and likewise on y. Neighboring segments share their edges.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: GridCoord,
    pub y: GridCoord,
}

impl MapPoint {
    pub fn new(x: GridCoord, y: GridCoord) -> MapPoint {
        MapPoint { x, y }
    }

    /// The segment whose half-open extent contains this point.
    pub fn segment(self) -> (GridCoord, GridCoord) {
        let s = GridCoord::from(SEGSCALE);
        (self.x.div_euclid(s), self.y.div_euclid(s))
    }

    /// Express this point in the local frame of segment `(sx, sy)`.
    ///
    /// # Panics
    ///
    /// Panics if the point lies outside that segment's closed extent.
    pub fn local_to(self, sx: GridCoord, sy: GridCoord) -> SegPos {
        let s = GridCoord::from(SEGSCALE);
        let lx = self.x - sx * s;
        let ly = self.y - sy * s;
        assert!(
            lx >= 0 && ly >= 0 && lx <= s && ly <= s,
            "Point {:?} is not within segment ({}, {})",
            self,
            sx,
            sy
        );
        SegPos::new(lx as u16, ly as u16)
    }

    /// Inverse of `local_to`.
    pub fn from_local(sx: GridCoord, sy: GridCoord, pos: SegPos) -> MapPoint {
        let s = GridCoord::from(SEGSCALE);
        MapPoint::new(sx * s + GridCoord::from(pos.x), sy * s + GridCoord::from(pos.y))
    }
}
