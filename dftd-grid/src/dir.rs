use super::GridCoord;

pub type DirIndex = u8;

/// One of the four cardinal directions a contour can step in
/// between raster vertices.
///
/// Indexes run counterclockwise in the map frame, where `y`
/// grows upward (north): 0 is down, 1 right, 2 up, 3 left.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Dir {
    pub index: DirIndex,
}

impl Dir {
    pub fn new(index: DirIndex) -> Dir {
        debug_assert!(index < 4, "direction index out of range");
        Dir { index }
    }

    pub fn down() -> Dir {
        Dir::new(0)
    }

    pub fn right() -> Dir {
        Dir::new(1)
    }

    pub fn up() -> Dir {
        Dir::new(2)
    }

    pub fn left() -> Dir {
        Dir::new(3)
    }

    /// Offset of the neighboring vertex in this direction.
    pub fn delta(self) -> (GridCoord, GridCoord) {
        DIR_DELTAS[self.index as usize]
    }

    /// The direction a quarter turn counterclockwise from this one.
    pub fn next_ccw(self) -> Dir {
        Dir::new((self.index + 1) % 4)
    }

    /// The direction a quarter turn clockwise from this one.
    pub fn next_cw(self) -> Dir {
        Dir::new((self.index + 4 - 1) % 4)
    }

    pub fn opposite(self) -> Dir {
        Dir::new((self.index + 2) % 4)
    }
}

impl From<DirIndex> for Dir {
    fn from(dir_index: DirIndex) -> Dir {
        Dir::new(dir_index)
    }
}

const DIR_DELTAS: [(GridCoord, GridCoord); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

// Occasionally useful when we need to iterate over all directions.
pub static DIRS: [Dir; 4] = [
    Dir { index: 0 },
    Dir { index: 1 },
    Dir { index: 2 },
    Dir { index: 3 },
];
