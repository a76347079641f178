//! Level files.
//!
//! A level is plain text:
//!
//! ```text
//! 3 4
//! 0 0
//! C.W.
//! .B..
//! ..WC
//! ```
//!
//! The first line holds the row and column counts, the second Robby's
//! starting row and column, and the remaining lines the grid itself using
//! `.` (or `E`) for empty cells, `C` for cans, `W` for walls and `B` for
//! batteries. The grid lines are joined before the size is checked, so a
//! level whose cells add up to the wrong total is rejected as malformed.

use crate::{Grid, Position, Result, RobbyError, World, WorldState};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// A parsed level: grid contents plus Robby's starting position.
///
/// # Examples
///
/// ```
/// use robby::{Level, Position};
///
/// let level: Level = "1 3\n0 0\nC.C\n".parse().unwrap();
/// assert_eq!(level.start(), Position::new(0, 0));
/// assert_eq!(level.grid().encode(), "CEC");
///
/// let state = level.initial_state(7).unwrap();
/// assert_eq!(state.battery(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    grid: Grid,
    start: Position,
}

impl Level {
    pub fn new(grid: Grid, start: Position) -> Result<Self> {
        if !grid.contains(start) {
            return Err(RobbyError::OutOfBounds {
                row: start.row,
                col: start.col,
                rows: grid.rows(),
                cols: grid.cols(),
            });
        }
        Ok(Self { grid, start })
    }

    /// Parses level text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().map(str::trim);

        let (rows, cols) = parse_pair(lines.next(), "grid size")?;
        let (row, col) = parse_pair(lines.next(), "start position")?;
        let contents: String = lines.collect();

        let grid = Grid::parse(rows, cols, &contents)?;
        Self::new(grid, Position::new(row, col))
    }

    /// Reads and parses a level file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded level from {}", path.as_ref().display());
        Self::parse(&text)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn start(&self) -> Position {
        self.start
    }

    /// Snapshot at the start of the level with a full battery.
    pub fn initial_state(&self, capacity: u32) -> Result<WorldState> {
        WorldState::new(self.grid.clone(), self.start, capacity)
    }

    /// Live world loaded with this level.
    pub fn world(&self, capacity: u32) -> Result<World> {
        let mut world = World::new(self.grid.rows(), self.grid.cols())?;
        world.load(&self.grid.encode())?;
        world.goto(self.start)?;
        world.set_full_battery(capacity)?;
        Ok(world)
    }
}

impl FromStr for Level {
    type Err = RobbyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_pair(line: Option<&str>, what: &str) -> Result<(usize, usize)> {
    let line = line.ok_or_else(|| RobbyError::LevelFormat(format!("missing {} line", what)))?;
    let numbers = line
        .split_whitespace()
        .map(|word| {
            word.parse::<usize>().map_err(|_| {
                RobbyError::LevelFormat(format!("{} is not a number: {:?}", what, word))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    match numbers.as_slice() {
        [a, b] => Ok((*a, *b)),
        _ => Err(RobbyError::LevelFormat(format!(
            "{} needs two numbers, got {:?}",
            what, line
        ))),
    }
}
