use super::{Dir, GridCoord};

/// A vertex of the raster grid, i.e. a corner shared by up to four cells.
///
/// Vertices run from `(0, 0)` to `(width, height)` _inclusive_.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct RasterPoint {
    pub x: GridCoord,
    pub y: GridCoord,
}

impl RasterPoint {
    pub fn new(x: GridCoord, y: GridCoord) -> RasterPoint {
        RasterPoint { x, y }
    }

    pub fn with_x(&self, new_x: GridCoord) -> Self {
        let mut new_point = *self;
        new_point.x = new_x;
        new_point
    }

    pub fn with_y(&self, new_y: GridCoord) -> Self {
        let mut new_point = *self;
        new_point.y = new_y;
        new_point
    }

    /// The neighboring vertex one step in `dir`.
    pub fn step(&self, dir: Dir) -> RasterPoint {
        let (dx, dy) = dir.delta();
        RasterPoint::new(self.x + dx, self.y + dy)
    }

    /// `true` if this vertex lies on a vertical or horizontal line
    /// of a grid with the given spacing.
    pub fn is_on_grid_line(&self, spacing: GridCoord) -> bool {
        self.x % spacing == 0 || self.y % spacing == 0
    }
}
