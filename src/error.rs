use crate::Action;
use thiserror::Error;

/// Errors surfaced to callers of the Robby planning library.
///
/// Only structural problems end up here: a level that does not describe a
/// well-formed grid, an action symbol outside the alphabet, or a search that
/// was stopped from outside. A search that simply finds no plan is not an
/// error; it is reported as [`SearchOutcome::Exhausted`](crate::SearchOutcome).
///
/// # Examples
///
/// ```
/// use robby::RobbyError;
///
/// let err = RobbyError::MalformedLevel { expected: 6, actual: 5 };
/// assert_eq!(
///     err.to_string(),
///     "Malformed level: expected 6 cells, found 5"
/// );
/// ```
#[derive(Error, Debug)]
pub enum RobbyError {
    /// The grid contents do not contain exactly rows x cols cells
    #[error("Malformed level: expected {expected} cells, found {actual}")]
    MalformedLevel { expected: usize, actual: usize },

    /// A grid symbol other than `.`, `E`, `C`, `W` or `B`
    #[error("Invalid cell symbol: {0:?}")]
    InvalidSymbol(char),

    /// An action symbol other than `N`, `S`, `E`, `W` or `G`
    #[error("Illegal action: {0:?}")]
    IllegalAction(char),

    #[error("Action listed more than once in alphabet: {0}")]
    DuplicateAction(Action),

    #[error("Action alphabet is empty")]
    EmptyAlphabet,

    /// A position outside the grid
    #[error("Position ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Zero rows or columns, or more cells than fit in memory
    #[error("Invalid grid dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Battery capacity must be positive")]
    InvalidBattery,

    /// The level text could not be split into header and grid lines
    #[error("Level format error: {0}")]
    LevelFormat(String),

    #[error("Search cancelled after {expanded} expansions")]
    Cancelled { expanded: usize },

    #[error("Search stopped after reaching the limit of {0} expansions")]
    ExpansionLimit(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Robby operations
pub type Result<T> = std::result::Result<T, RobbyError>;
