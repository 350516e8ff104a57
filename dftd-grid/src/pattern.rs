//! Classification of the 2×2 cell neighborhood around a raster vertex.
//!
//! A vertex `(x, y)` touches four cells. Bit `j` of the pattern is the land
//! flag of the cell at `(x + NEIGHBOR_OFFSETS[j].0, y + NEIGHBOR_OFFSETS[j].1)`,
//! which lays the bits out like this (north up):
//!
//! ```text
//! 3 2
//! 0 1
//! ```
//!
//! All sixteen patterns:
//!
//! ```text
//!  0   1   2   3   4   5   6   7   8   9  10  11  12  13  14  15
//! ..  ..  ..  ..  .#  .#  .#  .#  #.  #.  #.  #.  ##  ##  ##  ##
//! ..  #.  .#  ##  ..  #.  .#  ##  ..  #.  .#  ##  ..  #.  .#  ##
//! ```
//!
//! Patterns 0 and 15 have no boundary through the vertex. Patterns 5 and 10
//! are saddles: two boundaries meet at the vertex and the way out depends on
//! the way in.

use super::{Dir, GridCoord};

pub type Pattern = u8;

pub const NEIGHBOR_OFFSETS: [(GridCoord, GridCoord); 4] = [(-1, -1), (0, -1), (0, 0), (-1, 0)];

/// Direction to step from a vertex with the given pattern so that land
/// stays on the left. -1 where no unique direction exists.
pub const RUN_LAND_LEFT: [i8; 16] = [-1, 3, 0, 3, 1, -1, 0, 3, 2, 2, -1, 2, 1, 1, 0, -1];

/// Direction to step from a vertex with the given pattern so that land
/// stays on the right. -1 where no unique direction exists.
pub const RUN_LAND_RIGHT: [i8; 16] = [-1, 0, 1, 1, 2, -1, 2, 2, 3, 0, -1, 1, 3, 0, 3, -1];

/// Which side of the walker the land is kept on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Handedness {
    LandLeft,
    LandRight,
}

pub fn run_land_left(pattern: Pattern) -> Option<Dir> {
    table_dir(&RUN_LAND_LEFT, pattern)
}

pub fn run_land_right(pattern: Pattern) -> Option<Dir> {
    table_dir(&RUN_LAND_RIGHT, pattern)
}

fn table_dir(table: &[i8; 16], pattern: Pattern) -> Option<Dir> {
    let entry = table[(pattern & 0x0f) as usize];
    if entry < 0 {
        None
    } else {
        Some(Dir::new(entry as u8))
    }
}

/// `true` for every pattern a coastline trace may start from:
/// all except the two uniform patterns and the two saddles.
pub fn is_traceable(pattern: Pattern) -> bool {
    match pattern {
        0 | 5 | 10 | 15 => false,
        _ => true,
    }
}

pub fn is_saddle(pattern: Pattern) -> bool {
    pattern == 5 || pattern == 10
}

/// Pick the next step direction for a walk keeping land on the given side.
///
/// Saddle patterns resolve against the previous step: the walk always turns
/// so that it separates the two diagonal land cells instead of crossing
/// between them.
///
/// # Panics
///
/// Panics on a uniform pattern, on a saddle without a previous step, or on
/// a saddle entered from a direction that cannot reach it. Each of these
/// means the walk left the coastline.
pub fn next_dir(pattern: Pattern, previous: Option<Dir>, handedness: Handedness) -> Dir {
    if is_saddle(pattern) {
        let previous = previous.expect("Illegal start pattern: walk cannot begin on a saddle");
        return match (handedness, pattern) {
            (Handedness::LandRight, 10) => {
                assert!(
                    previous.index == 0 || previous.index == 2,
                    "Illegal previous direction {} into saddle 10",
                    previous.index
                );
                previous.next_ccw()
            }
            (Handedness::LandRight, _) => {
                assert!(
                    previous.index == 1 || previous.index == 3,
                    "Illegal previous direction {} into saddle 5",
                    previous.index
                );
                previous.next_ccw()
            }
            (Handedness::LandLeft, 10) => {
                assert!(
                    previous.index == 1 || previous.index == 3,
                    "Illegal previous direction {} into saddle 10",
                    previous.index
                );
                previous.next_cw()
            }
            (Handedness::LandLeft, _) => {
                assert!(
                    previous.index == 0 || previous.index == 2,
                    "Illegal previous direction {} into saddle 5",
                    previous.index
                );
                previous.next_cw()
            }
        };
    }
    let dir = match handedness {
        Handedness::LandLeft => run_land_left(pattern),
        Handedness::LandRight => run_land_right(pattern),
    };
    dir.unwrap_or_else(|| panic!("No direction for pattern {}; not on a coastline", pattern))
}
