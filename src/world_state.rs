//! Immutable world snapshots and the transition rules between them.
//!
//! A [`WorldState`] is everything the planner needs to know about Robby's
//! world at one instant: the grid contents, Robby's position, the battery
//! left and the capacity a battery pickup restores. Snapshots are never
//! mutated; [`WorldState::apply_action`] returns a new one or a
//! [`Rejection`] describing why the action is not a legal transition.
//!
//! # Example
//!
//! ```
//! use robby::{Action, Grid, Position, Rejection, WorldState};
//!
//! let grid = Grid::parse(1, 2, "CC").unwrap();
//! let start = WorldState::new(grid, Position::new(0, 0), 7).unwrap();
//!
//! let grabbed = start.apply_action(Action::Grab).unwrap();
//! assert_eq!(grabbed.remaining_cans(), 1);
//! assert_eq!(grabbed.battery(), 6);
//!
//! assert_eq!(start.apply_action(Action::West), Err(Rejection::OutOfBounds(Action::West)));
//! ```

use crate::{Action, Cell, Grid, Position, Result, RobbyError};
use std::fmt;
use thiserror::Error;

/// Why an action is not a legal transition from a given state.
///
/// These are pruning signals for the planner and validator, never reported
/// to users as failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The move would leave the grid
    #[error("{0} would leave the grid")]
    OutOfBounds(Action),

    /// The move would run into a wall
    #[error("{0} is blocked by a wall")]
    Blocked(Action),

    /// Grab on an empty cell or a wall
    #[error("nothing to grab")]
    NothingToGrab,

    /// The action would leave the battery empty or below
    #[error("battery exhausted")]
    BatteryExhausted,

    /// Robby tried to walk off a can without picking it up
    #[error("{0} leaves a can behind")]
    MustGrab(Action),
}

/// Optional variations on the transition rules.
///
/// The defaults are the strict rules: a step that leaves the battery at zero
/// is rejected, and Robby may walk off a can without grabbing it.
///
/// # Examples
///
/// ```
/// use robby::{Action, Grid, Position, TransitionRules, WorldState};
///
/// let grid = Grid::parse(1, 2, "EC").unwrap();
/// let start = WorldState::new(grid, Position::new(0, 0), 1).unwrap();
///
/// assert!(start.apply_action(Action::East).is_err());
///
/// let lenient = TransitionRules::default().allow_empty_battery(true);
/// assert_eq!(start.apply_action_with(Action::East, lenient).unwrap().battery(), 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TransitionRules {
    allow_empty_battery: bool,
    must_grab_cans: bool,
}

impl TransitionRules {
    /// Accept steps that leave the battery at exactly zero.
    pub fn allow_empty_battery(mut self, allow: bool) -> Self {
        self.allow_empty_battery = allow;
        self
    }

    /// Reject any move made while standing on a can.
    pub fn must_grab_cans(mut self, required: bool) -> Self {
        self.must_grab_cans = required;
        self
    }

    pub fn allows_empty_battery(&self) -> bool {
        self.allow_empty_battery
    }

    pub fn requires_grab_on_cans(&self) -> bool {
        self.must_grab_cans
    }
}

/// Search-node identity of a [`WorldState`].
///
/// Position and grid contents always take part; the battery level only when
/// the key was built with `include_battery`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    position: Position,
    grid: Grid,
    battery: Option<u32>,
}

/// Snapshot of Robby's world.
///
/// Invariants: the position lies inside the grid and the capacity is
/// positive. Both are checked by [`WorldState::new`] and preserved by every
/// transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorldState {
    grid: Grid,
    position: Position,
    battery: u32,
    capacity: u32,
}

impl WorldState {
    /// Creates a snapshot with a full battery.
    ///
    /// # Errors
    ///
    /// * `OutOfBounds` if `position` is not inside `grid`
    /// * `InvalidBattery` if `capacity` is zero
    pub fn new(grid: Grid, position: Position, capacity: u32) -> Result<Self> {
        if !grid.contains(position) {
            return Err(RobbyError::OutOfBounds {
                row: position.row,
                col: position.col,
                rows: grid.rows(),
                cols: grid.cols(),
            });
        }
        if capacity == 0 {
            return Err(RobbyError::InvalidBattery);
        }
        Ok(Self {
            grid,
            position,
            battery: capacity,
            capacity,
        })
    }

    /// Same snapshot with a partially drained battery.
    pub fn with_battery(mut self, battery: u32) -> Self {
        self.battery = battery;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn battery(&self) -> u32 {
        self.battery
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// Content of the cell at `pos`.
    pub fn cell_at(&self, pos: Position) -> Result<Cell> {
        self.grid.cell(pos)
    }

    /// Content of the cell Robby stands on.
    pub fn current_cell(&self) -> Cell {
        // position is kept in bounds by construction
        self.grid.get(self.position).unwrap_or(Cell::Empty)
    }

    pub fn remaining_cans(&self) -> usize {
        self.grid.count(Cell::Can)
    }

    /// Whether every can has been collected.
    pub fn is_solved(&self) -> bool {
        self.remaining_cans() == 0
    }

    /// Applies one action under the default [`TransitionRules`].
    ///
    /// Every action costs one unit of battery and a battery pickup then
    /// refills it, so grabbing a battery always leaves Robby at full
    /// capacity. Any other step that would leave the battery at zero or
    /// below is rejected.
    pub fn apply_action(&self, action: Action) -> std::result::Result<WorldState, Rejection> {
        self.apply_action_with(action, TransitionRules::default())
    }

    /// Applies one action under the given rules.
    pub fn apply_action_with(
        &self,
        action: Action,
        rules: TransitionRules,
    ) -> std::result::Result<WorldState, Rejection> {
        let Some(delta) = action.delta() else {
            return self.grab(rules);
        };

        if rules.requires_grab_on_cans() && self.current_cell() == Cell::Can {
            return Err(Rejection::MustGrab(action));
        }
        let target = self
            .position
            .offset(delta)
            .filter(|&pos| self.grid.contains(pos))
            .ok_or(Rejection::OutOfBounds(action))?;
        if self.grid.get(target) == Some(Cell::Wall) {
            return Err(Rejection::Blocked(action));
        }

        Ok(WorldState {
            grid: self.grid.clone(),
            position: target,
            battery: self.drain(action, rules)?,
            capacity: self.capacity,
        })
    }

    fn grab(&self, rules: TransitionRules) -> std::result::Result<WorldState, Rejection> {
        let battery = match self.current_cell() {
            Cell::Battery => self.capacity,
            Cell::Can => self.drain(Action::Grab, rules)?,
            Cell::Empty | Cell::Wall => return Err(Rejection::NothingToGrab),
        };
        let grid = self
            .grid
            .with_cell(self.position, Cell::Empty)
            .map_err(|_| Rejection::NothingToGrab)?;

        Ok(WorldState {
            grid,
            position: self.position,
            battery,
            capacity: self.capacity,
        })
    }

    /// Battery left after paying for `action`.
    fn drain(&self, action: Action, rules: TransitionRules) -> std::result::Result<u32, Rejection> {
        match self.battery.checked_sub(action.cost()) {
            Some(0) if !rules.allows_empty_battery() => Err(Rejection::BatteryExhausted),
            Some(left) => Ok(left),
            None => Err(Rejection::BatteryExhausted),
        }
    }

    /// Canonical text encoding of position and contents, e.g. `"0,1:ECB"`.
    ///
    /// Two snapshots with the same position and contents encode identically,
    /// whatever actions produced them.
    pub fn encode(&self) -> String {
        format!(
            "{},{}:{}",
            self.position.row,
            self.position.col,
            self.grid.encode()
        )
    }

    /// Deduplication key for search.
    pub fn key(&self, include_battery: bool) -> StateKey {
        StateKey {
            position: self.position,
            grid: self.grid.clone(),
            battery: include_battery.then_some(self.battery),
        }
    }

    /// Whether `other` has the same position and contents, ignoring battery.
    pub fn same_place(&self, other: &WorldState) -> bool {
        self.position == other.position
            && (self.grid.shares_contents(&other.grid) || self.grid == other.grid)
    }
}

/// Renders row-major `cells` one row per line: `R` marks Robby (`RC`/`RB`
/// when it stands on a can or battery), `.` an empty cell.
pub(crate) fn render(
    f: &mut fmt::Formatter<'_>,
    cols: usize,
    cells: &[Cell],
    robby: Position,
) -> fmt::Result {
    for (row, line_cells) in cells.chunks(cols.max(1)).enumerate() {
        let mut line = String::with_capacity(cols * 3);
        for (col, &cell) in line_cells.iter().enumerate() {
            let text = match (Position::new(row, col) == robby, cell) {
                (true, Cell::Empty) => "R".to_string(),
                (true, cell) => format!("R{}", cell.symbol()),
                (false, Cell::Empty) => ".".to_string(),
                (false, cell) => cell.symbol().to_string(),
            };
            line.push_str(&format!("{:<3}", text));
        }
        writeln!(f, "{}", line.trim_end())?;
    }
    Ok(())
}

impl fmt::Display for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, self.cols(), self.grid.cells(), self.position)
    }
}
