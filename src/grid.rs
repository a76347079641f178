//! Cell contents, positions and the immutable grid they live in.
//!
//! A [`Grid`] is a rows x cols matrix of [`Cell`]s stored row-major. Its
//! contents are shared behind an [`Arc`], so moving Robby around produces new
//! snapshots without copying the cells; only a grab allocates a fresh copy.

use crate::{Result, RobbyError};
use std::fmt;
use std::sync::Arc;

/// What occupies a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cell {
    Empty,
    Can,
    Wall,
    Battery,
}

impl Cell {
    /// Parses a cell symbol. Both `E` and the level-file `.` mean empty.
    pub fn from_symbol(symbol: char) -> Result<Self> {
        match symbol {
            'E' | '.' => Ok(Cell::Empty),
            'C' => Ok(Cell::Can),
            'W' => Ok(Cell::Wall),
            'B' => Ok(Cell::Battery),
            other => Err(RobbyError::InvalidSymbol(other)),
        }
    }

    /// Canonical symbol, as used in state encodings.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => 'E',
            Cell::Can => 'C',
            Cell::Wall => 'W',
            Cell::Battery => 'B',
        }
    }

    /// Whether a grab on this cell picks something up.
    pub fn is_grabbable(self) -> bool {
        matches!(self, Cell::Can | Cell::Battery)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A (row, col) coordinate, 0-indexed from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The neighbouring coordinate at the given offset, or `None` if it would
    /// be negative. Upper bounds are the grid's concern.
    pub fn offset(self, (dr, dc): (isize, isize)) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add_signed(dr)?,
            col: self.col.checked_add_signed(dc)?,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

/// Immutable rows x cols cell matrix.
///
/// Invariant: `cells.len() == rows * cols`, checked at construction.
///
/// # Examples
///
/// ```
/// use robby::{Cell, Grid, Position};
///
/// let grid = Grid::parse(1, 3, "CWB").unwrap();
/// assert_eq!(grid.cell(Position::new(0, 1)).unwrap(), Cell::Wall);
/// assert_eq!(grid.count(Cell::Can), 1);
/// assert!(grid.cell(Position::new(1, 0)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Arc<[Cell]>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize, cells: Vec<Cell>) -> Result<Self> {
        let expected = rows
            .checked_mul(cols)
            .filter(|&n| n > 0)
            .ok_or(RobbyError::InvalidDimensions { rows, cols })?;
        if cells.len() != expected {
            return Err(RobbyError::MalformedLevel {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            cells: cells.into(),
        })
    }

    /// Builds a grid from a content string of `rows * cols` cell symbols.
    pub fn parse(rows: usize, cols: usize, contents: &str) -> Result<Self> {
        let cells = contents
            .chars()
            .map(Cell::from_symbol)
            .collect::<Result<Vec<_>>>()?;
        Self::new(rows, cols, cells)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: Position) -> Result<usize> {
        if self.contains(pos) {
            Ok(pos.row * self.cols + pos.col)
        } else {
            Err(RobbyError::OutOfBounds {
                row: pos.row,
                col: pos.col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Content of the cell at `pos`, or `OutOfBounds`.
    pub fn cell(&self, pos: Position) -> Result<Cell> {
        let idx = self.index(pos)?;
        Ok(self.cells[idx])
    }

    /// Content of the cell at `pos`, or `None` outside the grid.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).ok().map(|idx| self.cells[idx])
    }

    /// Copy of this grid with one cell replaced.
    pub fn with_cell(&self, pos: Position, cell: Cell) -> Result<Self> {
        let idx = self.index(pos)?;
        let mut cells = self.cells.to_vec();
        cells[idx] = cell;
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            cells: cells.into(),
        })
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Whether both grids share the same backing storage.
    pub(crate) fn shares_contents(&self, other: &Grid) -> bool {
        Arc::ptr_eq(&self.cells, &other.cells)
    }

    /// Row-major content string, e.g. `"CEB"`.
    pub fn encode(&self) -> String {
        self.cells.iter().map(|c| c.symbol()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_symbols() {
        assert_eq!(Cell::from_symbol('.').unwrap(), Cell::Empty);
        assert_eq!(Cell::from_symbol('E').unwrap(), Cell::Empty);
        assert_eq!(Cell::from_symbol('B').unwrap(), Cell::Battery);
        assert!(matches!(
            Cell::from_symbol('x'),
            Err(RobbyError::InvalidSymbol('x'))
        ));
        assert_eq!(Cell::Wall.to_string(), "W");
    }

    #[test]
    fn test_grabbable() {
        assert!(Cell::Can.is_grabbable());
        assert!(Cell::Battery.is_grabbable());
        assert!(!Cell::Empty.is_grabbable());
        assert!(!Cell::Wall.is_grabbable());
    }

    #[test]
    fn test_position_offset() {
        let pos = Position::new(0, 1);
        assert_eq!(pos.offset((0, 1)), Some(Position::new(0, 2)));
        assert_eq!(pos.offset((0, -1)), Some(Position::new(0, 0)));
        assert_eq!(pos.offset((-1, 0)), None);
    }

    #[test]
    fn test_grid_length_mismatch() {
        let result = Grid::parse(2, 2, "CCC");
        assert!(matches!(
            result,
            Err(RobbyError::MalformedLevel {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_grid_zero_dimensions() {
        assert!(matches!(
            Grid::new(0, 3, Vec::new()),
            Err(RobbyError::InvalidDimensions { rows: 0, cols: 3 })
        ));
    }

    #[test]
    fn test_grid_dimensions_overflow() {
        assert!(matches!(
            Grid::new(usize::MAX, 2, vec![Cell::Can]),
            Err(RobbyError::InvalidDimensions { cols: 2, .. })
        ));
    }

    #[test]
    fn test_row_major_lookup() {
        let grid = Grid::parse(2, 3, "EECWBE").unwrap();
        assert_eq!(grid.cell(Position::new(0, 2)).unwrap(), Cell::Can);
        assert_eq!(grid.cell(Position::new(1, 0)).unwrap(), Cell::Wall);
        assert_eq!(grid.cell(Position::new(1, 1)).unwrap(), Cell::Battery);
        assert_eq!(grid.get(Position::new(1, 2)), Some(Cell::Empty));
        assert_eq!(grid.get(Position::new(2, 0)), None);
        assert!(matches!(
            grid.cell(Position::new(0, 3)),
            Err(RobbyError::OutOfBounds { row: 0, col: 3, .. })
        ));
    }

    #[test]
    fn test_with_cell_leaves_original_untouched() {
        let grid = Grid::parse(1, 2, "CC").unwrap();
        let grabbed = grid.with_cell(Position::new(0, 0), Cell::Empty).unwrap();
        assert_eq!(grid.encode(), "CC");
        assert_eq!(grabbed.encode(), "EC");
        assert!(!grid.shares_contents(&grabbed));
        assert_eq!(grabbed.count(Cell::Can), 1);
    }

    #[test]
    fn test_clone_shares_contents() {
        let grid = Grid::parse(1, 2, "CB").unwrap();
        let copy = grid.clone();
        assert!(grid.shares_contents(&copy));
        assert_eq!(grid, copy);
    }
}
