//! The live simulation.
//!
//! [`World`] is the mutable counterpart of [`WorldState`]: it is what an
//! interactive front end drives step by step and draws. It keeps score,
//! accumulated cost and remaining battery the way the game scores them,
//! including the heavier penalty for crashing into a wall or the edge of
//! the grid.
//!
//! The planner never touches a `World`. Take a [`World::snapshot`] and plan
//! on that; replay the resulting path with [`World::replay`], which borrows
//! the world mutably and so cannot overlap with another replay.

use crate::world_state::render;
use crate::{Action, ActionPath, Cell, Grid, Position, Result, RobbyError, WorldState};
use rand::Rng;
use std::fmt;

/// Cost of a regular action.
pub const COST_PER_ACTION: i64 = 1;
/// Cost of bumping into a wall or the edge of the grid.
pub const COST_PER_CRASH: i64 = 10;
pub const SCORE_PER_CAN: i64 = 1;
pub const SCORE_PER_BATTERY: i64 = 0;

/// What happened when the live world performed an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved(Position),
    /// Picked up a can or a battery
    Grabbed(Cell),
    /// Grab on an empty cell: nothing changes
    NothingGrabbed,
    /// The move was blocked; Robby stays put and pays the crash cost
    Crashed(Action),
}

/// Contents of Robby's cell and its four neighbours.
///
/// Anything beyond the edge of the grid is reported as a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percept {
    pub here: Cell,
    pub north: Cell,
    pub south: Cell,
    pub east: Cell,
    pub west: Cell,
}

/// Mutable world owned by the interactive layer.
#[derive(Debug, Clone)]
pub struct World {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    position: Position,
    score: i64,
    cost: i64,
    battery: i64,
    full_battery: u32,
    original: Option<Vec<Cell>>,
}

impl World {
    /// An empty `rows` x `cols` world with Robby in the top-left corner.
    ///
    /// The battery capacity defaults to one unit per cell.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let size = rows
            .checked_mul(cols)
            .filter(|&n| n > 0)
            .ok_or(RobbyError::InvalidDimensions { rows, cols })?;
        let full_battery = u32::try_from(size).unwrap_or(u32::MAX);
        Ok(Self {
            rows,
            cols,
            cells: vec![Cell::Empty; size],
            position: Position::default(),
            score: 0,
            cost: 0,
            battery: i64::from(full_battery),
            full_battery,
            original: None,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn cost(&self) -> i64 {
        self.cost
    }

    /// Remaining battery; negative after a crash on a nearly empty battery.
    pub fn battery(&self) -> i64 {
        self.battery
    }

    pub fn full_battery(&self) -> u32 {
        self.full_battery
    }

    /// Robby is out of power.
    pub fn is_dead(&self) -> bool {
        self.battery <= 0
    }

    pub fn cans_remaining(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Can).count()
    }

    fn index(&self, pos: Position) -> Option<usize> {
        (pos.row < self.rows && pos.col < self.cols).then(|| pos.row * self.cols + pos.col)
    }

    fn out_of_bounds(&self, pos: Position) -> RobbyError {
        RobbyError::OutOfBounds {
            row: pos.row,
            col: pos.col,
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub fn cell_at(&self, pos: Position) -> Result<Cell> {
        self.index(pos)
            .map(|idx| self.cells[idx])
            .ok_or_else(|| self.out_of_bounds(pos))
    }

    /// Replaces the grid contents and remembers them for [`World::reset`].
    ///
    /// `contents` is a row-major string of cell symbols; `.` and `E` are both
    /// accepted for empty cells.
    pub fn load(&mut self, contents: &str) -> Result<()> {
        let cells = contents
            .chars()
            .map(Cell::from_symbol)
            .collect::<Result<Vec<_>>>()?;
        let expected = self.rows * self.cols;
        if cells.len() != expected {
            return Err(RobbyError::MalformedLevel {
                expected,
                actual: cells.len(),
            });
        }
        self.original = Some(cells.clone());
        self.cells = cells;
        Ok(())
    }

    /// Puts Robby directly on a cell.
    pub fn goto(&mut self, pos: Position) -> Result<()> {
        if self.index(pos).is_none() {
            return Err(self.out_of_bounds(pos));
        }
        self.position = pos;
        Ok(())
    }

    /// Sets the battery capacity and fills the battery.
    pub fn set_full_battery(&mut self, capacity: u32) -> Result<()> {
        if capacity == 0 {
            return Err(RobbyError::InvalidBattery);
        }
        self.full_battery = capacity;
        self.battery = i64::from(capacity);
        Ok(())
    }

    /// Restores the loaded contents, score, cost and battery.
    ///
    /// Robby's position is left alone; callers move Robby back with
    /// [`World::goto`].
    pub fn reset(&mut self) {
        if let Some(original) = &self.original {
            self.cells = original.clone();
        }
        self.score = 0;
        self.cost = 0;
        self.battery = i64::from(self.full_battery);
    }

    /// Performs one action, charging cost and battery like the game does.
    pub fn perform(&mut self, action: Action) -> StepOutcome {
        let outcome = match action.delta() {
            Some(delta) => {
                let target = self
                    .position
                    .offset(delta)
                    .and_then(|pos| self.index(pos).map(|idx| (pos, idx)));
                match target {
                    Some((pos, idx)) if self.cells[idx] != Cell::Wall => {
                        self.position = pos;
                        self.charge(COST_PER_ACTION);
                        StepOutcome::Moved(pos)
                    }
                    _ => {
                        self.charge(COST_PER_CRASH);
                        StepOutcome::Crashed(action)
                    }
                }
            }
            None => self.grab(),
        };
        log::debug!(
            "{} -> {:?} (score {}, cost {}, battery {}/{})",
            action,
            outcome,
            self.score,
            self.cost,
            self.battery,
            self.full_battery
        );
        outcome
    }

    fn grab(&mut self) -> StepOutcome {
        let Some(idx) = self.index(self.position) else {
            return StepOutcome::NothingGrabbed;
        };
        match self.cells[idx] {
            Cell::Battery => {
                self.score += SCORE_PER_BATTERY;
                self.cost += COST_PER_ACTION;
                self.battery = i64::from(self.full_battery);
                self.cells[idx] = Cell::Empty;
                StepOutcome::Grabbed(Cell::Battery)
            }
            Cell::Can => {
                self.score += SCORE_PER_CAN;
                self.charge(COST_PER_ACTION);
                self.cells[idx] = Cell::Empty;
                StepOutcome::Grabbed(Cell::Can)
            }
            Cell::Empty | Cell::Wall => StepOutcome::NothingGrabbed,
        }
    }

    fn charge(&mut self, amount: i64) {
        self.cost += amount;
        self.battery -= amount;
    }

    /// Robby's cell and the four cells around it.
    pub fn percept(&self) -> Percept {
        let look = |action: Action| {
            action
                .delta()
                .and_then(|delta| self.position.offset(delta))
                .and_then(|pos| self.index(pos))
                .map_or(Cell::Wall, |idx| self.cells[idx])
        };
        Percept {
            here: self.cell_at(self.position).unwrap_or(Cell::Empty),
            north: look(Action::North),
            south: look(Action::South),
            east: look(Action::East),
            west: look(Action::West),
        }
    }

    /// Immutable copy of the current world for planning.
    ///
    /// A negative battery is reported as empty.
    pub fn snapshot(&self) -> Result<WorldState> {
        let grid = Grid::new(self.rows, self.cols, self.cells.clone())?;
        let battery = u32::try_from(self.battery.max(0)).unwrap_or(self.full_battery);
        Ok(WorldState::new(grid, self.position, self.full_battery)?.with_battery(battery))
    }

    /// Performs every action of `path` in order, calling `on_step` after each.
    ///
    /// Front ends use the callback to redraw and pause between steps.
    pub fn replay<F>(&mut self, path: &ActionPath, mut on_step: F) -> Vec<StepOutcome>
    where
        F: FnMut(&World, Action, StepOutcome),
    {
        path.iter()
            .map(|action| {
                let outcome = self.perform(action);
                on_step(self, action, outcome);
                outcome
            })
            .collect()
    }

    /// Scatters `cell` over the grid, each cell independently with
    /// probability `density`. Walls are never dropped on Robby.
    pub fn distribute<R: Rng + ?Sized>(&mut self, cell: Cell, density: f64, rng: &mut R) {
        let robby = self.index(self.position);
        for idx in 0..self.cells.len() {
            if rng.random::<f64>() < density && !(cell == Cell::Wall && Some(idx) == robby) {
                self.cells[idx] = cell;
            }
        }
    }

    /// Score, cost and battery on one line.
    pub fn status(&self) -> String {
        format!(
            "SCORE = {}  COST = {}  BATTERY = {}/{}",
            self.score, self.cost, self.battery, self.full_battery
        )
    }
}

impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, self.cols, &self.cells, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn world(rows: usize, cols: usize, contents: &str, battery: u32) -> World {
        let mut world = World::new(rows, cols).unwrap();
        world.load(contents).unwrap();
        world.set_full_battery(battery).unwrap();
        world
    }

    #[test]
    fn test_new_world_defaults() {
        let world = World::new(2, 3).unwrap();
        assert_eq!(world.full_battery(), 6);
        assert_eq!(world.battery(), 6);
        assert_eq!(world.cans_remaining(), 0);
        assert!(matches!(
            World::new(0, 1),
            Err(RobbyError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            World::new(usize::MAX, 2),
            Err(RobbyError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_load_rejects_wrong_length() {
        let mut world = World::new(2, 2).unwrap();
        assert!(matches!(
            world.load("CCCCC"),
            Err(RobbyError::MalformedLevel {
                expected: 4,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_move_and_grab() {
        let mut w = world(1, 2, "CC", 7);
        assert_eq!(w.perform(Action::Grab), StepOutcome::Grabbed(Cell::Can));
        assert_eq!(
            w.perform(Action::East),
            StepOutcome::Moved(Position::new(0, 1))
        );
        assert_eq!(w.perform(Action::Grab), StepOutcome::Grabbed(Cell::Can));
        assert_eq!(w.score(), 2);
        assert_eq!(w.cost(), 3);
        assert_eq!(w.battery(), 4);
        assert_eq!(w.cans_remaining(), 0);
    }

    #[test]
    fn test_crash_costs_ten() {
        let mut w = world(1, 3, "EWE", 20);
        assert_eq!(w.perform(Action::East), StepOutcome::Crashed(Action::East));
        assert_eq!(w.perform(Action::North), StepOutcome::Crashed(Action::North));
        assert_eq!(w.position(), Position::new(0, 0));
        assert_eq!(w.cost(), 20);
        assert_eq!(w.battery(), 0);
        assert!(w.is_dead());
    }

    #[test]
    fn test_grab_battery_refills() {
        let mut w = world(1, 2, "EB", 5);
        w.perform(Action::East);
        w.perform(Action::Grab);
        assert_eq!(w.battery(), 5);
        assert_eq!(w.cost(), 2);
        assert_eq!(w.score(), 0);
        assert_eq!(w.perform(Action::Grab), StepOutcome::NothingGrabbed);
        assert_eq!(w.cost(), 2);
    }

    #[test]
    fn test_reset_restores_contents() {
        let mut w = world(1, 2, "CC", 7);
        w.perform(Action::Grab);
        w.perform(Action::East);
        w.reset();
        w.goto(Position::new(0, 0)).unwrap();
        assert_eq!(w.cans_remaining(), 2);
        assert_eq!(w.score(), 0);
        assert_eq!(w.cost(), 0);
        assert_eq!(w.battery(), 7);
    }

    #[test]
    fn test_goto_out_of_bounds() {
        let mut w = World::new(2, 2).unwrap();
        assert!(matches!(
            w.goto(Position::new(2, 0)),
            Err(RobbyError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_percept_reports_edges_as_walls() {
        let mut w = world(2, 2, "CBEW", 5);
        w.goto(Position::new(0, 0)).unwrap();
        assert_eq!(
            w.percept(),
            Percept {
                here: Cell::Can,
                north: Cell::Wall,
                south: Cell::Empty,
                east: Cell::Battery,
                west: Cell::Wall,
            }
        );
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut w = world(1, 2, "CC", 7);
        w.perform(Action::Grab);
        let snap = w.snapshot().unwrap();
        w.perform(Action::East);
        assert_eq!(snap.position(), Position::new(0, 0));
        assert_eq!(snap.battery(), 6);
        assert_eq!(snap.capacity(), 7);
        assert_eq!(snap.remaining_cans(), 1);
    }

    #[test]
    fn test_snapshot_of_dead_robot() {
        let mut w = world(1, 1, "C", 5);
        w.perform(Action::North);
        assert_eq!(w.battery(), -5);
        assert_eq!(w.snapshot().unwrap().battery(), 0);
    }

    #[test]
    fn test_replay_reports_every_step() {
        let mut w = world(1, 2, "CC", 7);
        let path: ActionPath = "GEG".parse().unwrap();
        let mut seen = Vec::new();
        let outcomes = w.replay(&path, |world, action, _| {
            seen.push((action, world.position()));
        });
        assert_eq!(outcomes.len(), 3);
        assert_eq!(
            seen,
            vec![
                (Action::Grab, Position::new(0, 0)),
                (Action::East, Position::new(0, 1)),
                (Action::Grab, Position::new(0, 1)),
            ]
        );
        assert_eq!(w.cans_remaining(), 0);
    }

    #[test]
    fn test_distribute_is_reproducible_and_spares_robby() {
        let mut a = World::new(4, 4).unwrap();
        let mut b = World::new(4, 4).unwrap();
        a.distribute(Cell::Wall, 1.0, &mut StdRng::seed_from_u64(7));
        b.distribute(Cell::Wall, 1.0, &mut StdRng::seed_from_u64(7));
        assert_eq!(a.cells, b.cells);
        assert_eq!(a.cell_at(Position::new(0, 0)).unwrap(), Cell::Empty);
        assert_eq!(a.cell_at(Position::new(3, 3)).unwrap(), Cell::Wall);

        a.distribute(Cell::Can, 0.0, &mut StdRng::seed_from_u64(7));
        assert_eq!(a.cans_remaining(), 0);
    }

    #[test]
    fn test_display_and_status() {
        let mut w = world(1, 3, "CEB", 4);
        w.goto(Position::new(0, 2)).unwrap();
        assert_eq!(w.to_string(), "C  .  RB\n");
        assert_eq!(w.status(), "SCORE = 0  COST = 0  BATTERY = 4/4");
    }
}
