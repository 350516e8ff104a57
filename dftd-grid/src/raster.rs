use thiserror::Error;

use super::pattern::{Pattern, NEIGHBOR_OFFSETS};
use super::{GridCoord, RasterPoint};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RasterError {
    #[error("raster dimensions must be nonzero, got {width}x{height}")]
    EmptyDimensions { width: GridCoord, height: GridCoord },
    #[error("a {width}x{height} raster needs {expected} cells, got {actual}")]
    CellCountMismatch {
        width: GridCoord,
        height: GridCoord,
        expected: usize,
        actual: usize,
    },
    #[error("cell ({x}, {y}) holds {value}; only 0 (sea) and 1 (land) are allowed")]
    IllegalCellValue { x: GridCoord, y: GridCoord, value: u8 },
    #[error("ascii raster row {row} has {actual} columns, expected {expected}")]
    RaggedAsciiRow { row: usize, expected: usize, actual: usize },
    #[error("ascii raster row {row} contains {found:?}; use '#' for land and '.' for sea")]
    IllegalAsciiChar { row: usize, found: char },
}

/// Binary land/sea bitmap.
///
/// Row 0 is the southernmost row; `y` grows northward, matching map
/// coordinates. Each cell holds 1 for land and 0 for sea.
///
/// Sampling outside the raster clamps to the nearest edge cell, so the
/// land/sea state of the outermost cells extends infinitely outward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterMap {
    width: GridCoord,
    height: GridCoord,
    // Sorted by (y, x).
    cells: Vec<u8>,
}

impl RasterMap {
    pub fn new(width: GridCoord, height: GridCoord, cells: Vec<u8>) -> Result<RasterMap, RasterError> {
        if width <= 0 || height <= 0 {
            return Err(RasterError::EmptyDimensions { width, height });
        }
        let expected = (width * height) as usize;
        if cells.len() != expected {
            return Err(RasterError::CellCountMismatch {
                width,
                height,
                expected,
                actual: cells.len(),
            });
        }
        if let Some(i) = cells.iter().position(|&value| value > 1) {
            return Err(RasterError::IllegalCellValue {
                x: i as GridCoord % width,
                y: i as GridCoord / width,
                value: cells[i],
            });
        }
        Ok(RasterMap { width, height, cells })
    }

    /// Build a raster by asking `is_land` about every cell.
    pub fn from_fn<F>(width: GridCoord, height: GridCoord, mut is_land: F) -> Result<RasterMap, RasterError>
    where
        F: FnMut(GridCoord, GridCoord) -> bool,
    {
        if width <= 0 || height <= 0 {
            return Err(RasterError::EmptyDimensions { width, height });
        }
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(if is_land(x, y) { 1 } else { 0 });
            }
        }
        RasterMap::new(width, height, cells)
    }

    /// Parse a raster drawn as text: `#` is land, `.` is sea.
    ///
    /// The first line is the _northernmost_ row, so the text reads like a
    /// map. Blank lines and surrounding whitespace are ignored.
    pub fn from_ascii(art: &str) -> Result<RasterMap, RasterError> {
        let rows: Vec<&str> = art
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyDimensions {
                width: width as GridCoord,
                height: height as GridCoord,
            });
        }
        let mut cells = vec![0u8; width * height];
        for (row, line) in rows.iter().enumerate() {
            let actual = line.chars().count();
            if actual != width {
                return Err(RasterError::RaggedAsciiRow {
                    row,
                    expected: width,
                    actual,
                });
            }
            let y = height - 1 - row;
            for (x, c) in line.chars().enumerate() {
                cells[y * width + x] = match c {
                    '#' => 1,
                    '.' => 0,
                    found => return Err(RasterError::IllegalAsciiChar { row, found }),
                };
            }
        }
        RasterMap::new(width as GridCoord, height as GridCoord, cells)
    }

    pub fn width(&self) -> GridCoord {
        self.width
    }

    pub fn height(&self) -> GridCoord {
        self.height
    }

    /// Cell value at `(x, y)`, clamping out-of-range coordinates to the edge.
    pub fn cell(&self, x: GridCoord, y: GridCoord) -> u8 {
        let cx = x.max(0).min(self.width - 1);
        let cy = y.max(0).min(self.height - 1);
        self.cells[(cy * self.width + cx) as usize]
    }

    pub fn is_land(&self, x: GridCoord, y: GridCoord) -> bool {
        self.cell(x, y) != 0
    }

    /// Neighborhood pattern of the four cells touching `vertex`.
    pub fn pattern_at(&self, vertex: RasterPoint) -> Pattern {
        let mut pattern: Pattern = 0;
        for (j, &(dx, dy)) in NEIGHBOR_OFFSETS.iter().enumerate() {
            pattern |= self.cell(vertex.x + dx, vertex.y + dy) << j;
        }
        pattern
    }

    /// Returns `true` if `vertex` lies within the raster's vertex grid,
    /// which includes the outer border.
    pub fn contains_vertex(&self, vertex: RasterPoint) -> bool {
        vertex.x >= 0 && vertex.y >= 0 && vertex.x <= self.width && vertex.y <= self.height
    }

    pub fn land_cell_count(&self) -> usize {
        self.cells.iter().filter(|&&value| value != 0).count()
    }
}

/// Which raster vertices have already been consumed by a coastline trace.
///
/// Kept apart from the land/sea cells so that the raster itself stays
/// immutable while coastlines are extracted.
#[derive(Clone, Debug)]
pub struct VisitedVertices {
    columns: GridCoord,
    rows: GridCoord,
    // Sorted by (y, x).
    visited: Vec<bool>,
}

impl VisitedVertices {
    pub fn new(raster: &RasterMap) -> VisitedVertices {
        let columns = raster.width() + 1;
        let rows = raster.height() + 1;
        VisitedVertices {
            columns,
            rows,
            visited: vec![false; (columns * rows) as usize],
        }
    }

    // Panics if given a vertex outside the raster.
    fn index(&self, vertex: RasterPoint) -> usize {
        assert!(
            vertex.x >= 0 && vertex.y >= 0 && vertex.x < self.columns && vertex.y < self.rows,
            "Vertex {:?} is outside the raster",
            vertex
        );
        (vertex.y * self.columns + vertex.x) as usize
    }

    pub fn is_visited(&self, vertex: RasterPoint) -> bool {
        self.visited[self.index(vertex)]
    }

    /// Mark `vertex` as visited. Returns `true` if it wasn't already.
    pub fn mark(&mut self, vertex: RasterPoint) -> bool {
        let i = self.index(vertex);
        let newly_marked = !self.visited[i];
        self.visited[i] = true;
        newly_marked
    }

    pub fn count(&self) -> usize {
        self.visited.iter().filter(|&&visited| visited).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_rows_run_north_to_south() {
        let raster = RasterMap::from_ascii(
            "
            #..
            ...
            ..#
            ",
        )
        .unwrap();
        assert_eq!(3, raster.width());
        assert_eq!(3, raster.height());
        assert!(raster.is_land(0, 2));
        assert!(raster.is_land(2, 0));
        assert!(!raster.is_land(0, 0));
        assert_eq!(2, raster.land_cell_count());
    }

    #[test]
    fn sampling_clamps_to_edges() {
        let raster = RasterMap::from_ascii(
            "
            #.
            .#
            ",
        )
        .unwrap();
        for (x, y) in iproduct!(-3..5, -3..5) {
            let cx = x.max(0).min(1);
            let cy = y.max(0).min(1);
            assert_eq!(raster.is_land(cx, cy), raster.is_land(x, y));
        }
    }

    #[test]
    fn pattern_of_lone_cell_corners() {
        let raster = RasterMap::from_ascii(
            "
            ...
            .#.
            ...
            ",
        )
        .unwrap();
        // The land cell is (1, 1); it sits in a different quadrant
        // of each of its four corner vertices.
        assert_eq!(4, raster.pattern_at(RasterPoint::new(1, 1)));
        assert_eq!(8, raster.pattern_at(RasterPoint::new(2, 1)));
        assert_eq!(1, raster.pattern_at(RasterPoint::new(2, 2)));
        assert_eq!(2, raster.pattern_at(RasterPoint::new(1, 2)));
        assert_eq!(0, raster.pattern_at(RasterPoint::new(0, 0)));
    }

    #[test]
    fn border_vertices_see_clamped_patterns() {
        let raster = RasterMap::from_ascii(
            "
            ..
            ##
            ",
        )
        .unwrap();
        // At the left border both columns of the neighborhood are the same cell column.
        assert_eq!(3, raster.pattern_at(RasterPoint::new(0, 1)));
        assert_eq!(3, raster.pattern_at(RasterPoint::new(2, 1)));
        assert_eq!(15, raster.pattern_at(RasterPoint::new(1, 0)));
    }

    #[test]
    fn rejects_malformed_cells() {
        assert_eq!(
            Err(RasterError::IllegalCellValue { x: 1, y: 0, value: 7 }),
            RasterMap::new(2, 1, vec![0, 7])
        );
        assert!(RasterMap::new(2, 2, vec![0, 1, 0]).is_err());
        assert!(RasterMap::new(0, 2, vec![]).is_err());
        assert!(RasterMap::from_ascii("#.\n#").is_err());
        assert!(RasterMap::from_ascii("#x").is_err());
    }

    #[test]
    fn visited_vertices_mark_once() {
        let raster = RasterMap::from_ascii("#.").unwrap();
        let mut visited = VisitedVertices::new(&raster);
        let corner = RasterPoint::new(2, 1);
        assert!(!visited.is_visited(corner));
        assert!(visited.mark(corner));
        assert!(!visited.mark(corner));
        assert!(visited.is_visited(corner));
        assert_eq!(1, visited.count());
    }
}
