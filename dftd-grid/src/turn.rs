use super::Dir;

/// How a contour changes direction from one step to the next.
///
/// There is deliberately no variant for turning around;
/// a boundary between land and sea never doubles back on itself,
/// so `Turn::between` reports that case as `None`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Eq, PartialEq)]
pub enum Turn {
    Straight,
    Left,
    Right,
}

impl Turn {
    /// Classify the turn taken when a walk heading `from` continues heading `to`.
    ///
    /// Returns `None` for a 180 degree turn.
    pub fn between(from: Dir, to: Dir) -> Option<Turn> {
        match (to.index + 4 - from.index) % 4 {
            0 => Some(Turn::Straight),
            1 => Some(Turn::Left),
            3 => Some(Turn::Right),
            _ => None,
        }
    }

    /// Signed quarter turns: clockwise (right) turns count positive.
    ///
    /// Summed along a closed walk this gives +4 for a clockwise loop
    /// and -4 for a counterclockwise one.
    pub fn quarter_turns(self) -> i32 {
        match self {
            Turn::Straight => 0,
            Turn::Left => -1,
            Turn::Right => 1,
        }
    }

    pub fn opposite(self) -> Turn {
        match self {
            Turn::Straight => Turn::Straight,
            Turn::Left => Turn::Right,
            Turn::Right => Turn::Left,
        }
    }
}

/// Running sum of quarter turns along a walk.
#[derive(Default, Clone, Copy, Debug, Eq, PartialEq)]
pub struct TurnCount {
    last_dir: Option<Dir>,
    quarter_turns: i32,
}

impl TurnCount {
    pub fn new() -> TurnCount {
        TurnCount::default()
    }

    /// Record a step in direction `dir`.
    ///
    /// # Panics
    ///
    /// Panics if `dir` is the reverse of the previous step.
    pub fn step(&mut self, dir: Dir) {
        if let Some(last_dir) = self.last_dir {
            let turn = Turn::between(last_dir, dir).expect("No 180 degree turns allowed!");
            self.quarter_turns += turn.quarter_turns();
        }
        self.last_dir = Some(dir);
    }

    pub fn last_dir(&self) -> Option<Dir> {
        self.last_dir
    }

    pub fn quarter_turns(&self) -> i32 {
        self.quarter_turns
    }
}
