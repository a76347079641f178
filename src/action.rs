//! # Action Module
//!
//! Robby can do exactly five things: step one cell north, south, east or
//! west, or grab whatever is lying in the cell it occupies. This module
//! provides:
//!
//! * [`Action`]: the closed set of those five actions
//! * [`ActionAlphabet`]: an ordered, duplicate-free selection of actions the
//!   planner may try, whose order decides which of several equally short
//!   plans is returned
//! * [`ActionPath`]: a sequence of actions, printed as a string such as `"GEG"`
//!
//! ## Basic Usage
//!
//! ```
//! use robby::{Action, ActionAlphabet, ActionPath};
//!
//! let alphabet: ActionAlphabet = "GNESW".parse().unwrap();
//! assert_eq!(alphabet.actions()[0], Action::Grab);
//!
//! let path: ActionPath = "GEG".parse().unwrap();
//! assert_eq!(path.len(), 3);
//! assert_eq!(path.to_string(), "GEG");
//! ```

use crate::{Result, RobbyError};
use std::fmt;
use std::str::FromStr;

/// One step Robby can take.
///
/// Every action costs one unit of battery when it is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    North,
    South,
    East,
    West,
    Grab,
}

impl Action {
    /// All actions in the conventional `GNESW` order.
    pub const ALL: [Action; 5] = [
        Action::Grab,
        Action::North,
        Action::East,
        Action::South,
        Action::West,
    ];

    /// Battery units consumed by a legal action.
    pub const COST: u32 = 1;

    /// Parses a single action symbol.
    ///
    /// # Examples
    ///
    /// ```
    /// use robby::{Action, RobbyError};
    ///
    /// assert_eq!(Action::from_symbol('N').unwrap(), Action::North);
    /// assert!(matches!(Action::from_symbol('x'), Err(RobbyError::IllegalAction('x'))));
    /// ```
    pub fn from_symbol(symbol: char) -> Result<Self> {
        match symbol {
            'N' => Ok(Action::North),
            'S' => Ok(Action::South),
            'E' => Ok(Action::East),
            'W' => Ok(Action::West),
            'G' => Ok(Action::Grab),
            other => Err(RobbyError::IllegalAction(other)),
        }
    }

    /// The one-letter symbol used in action strings.
    pub fn symbol(self) -> char {
        match self {
            Action::North => 'N',
            Action::South => 'S',
            Action::East => 'E',
            Action::West => 'W',
            Action::Grab => 'G',
        }
    }

    /// Row and column offset of a move, or `None` for [`Action::Grab`].
    pub fn delta(self) -> Option<(isize, isize)> {
        match self {
            Action::North => Some((-1, 0)),
            Action::South => Some((1, 0)),
            Action::East => Some((0, 1)),
            Action::West => Some((0, -1)),
            Action::Grab => None,
        }
    }

    pub fn is_move(self) -> bool {
        self.delta().is_some()
    }

    pub fn cost(self) -> u32 {
        Self::COST
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl TryFrom<char> for Action {
    type Error = RobbyError;

    fn try_from(symbol: char) -> Result<Self> {
        Action::from_symbol(symbol)
    }
}

/// Ordered set of actions the planner is allowed to try.
///
/// The order is the expansion priority: when several shortest plans exist,
/// the planner returns the one that prefers earlier actions first.
///
/// # Examples
///
/// ```
/// use robby::{Action, ActionAlphabet, RobbyError};
///
/// let alphabet: ActionAlphabet = "EG".parse().unwrap();
/// assert_eq!(alphabet.actions(), &[Action::East, Action::Grab]);
///
/// assert!(matches!(
///     "GG".parse::<ActionAlphabet>(),
///     Err(RobbyError::DuplicateAction(Action::Grab))
/// ));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionAlphabet {
    actions: Vec<Action>,
}

impl ActionAlphabet {
    /// Builds an alphabet from actions in priority order.
    ///
    /// Fails on an empty list or a repeated action.
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        if actions.is_empty() {
            return Err(RobbyError::EmptyAlphabet);
        }
        for (i, action) in actions.iter().enumerate() {
            if actions[..i].contains(action) {
                return Err(RobbyError::DuplicateAction(*action));
            }
        }
        Ok(Self { actions })
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn contains(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.actions.iter().copied()
    }
}

/// The `GNESW` alphabet.
impl Default for ActionAlphabet {
    fn default() -> Self {
        Self {
            actions: Action::ALL.to_vec(),
        }
    }
}

impl FromStr for ActionAlphabet {
    type Err = RobbyError;

    fn from_str(s: &str) -> Result<Self> {
        let actions = s
            .trim()
            .chars()
            .map(Action::from_symbol)
            .collect::<Result<Vec<_>>>()?;
        Self::new(actions)
    }
}

impl fmt::Display for ActionAlphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in &self.actions {
            write!(f, "{}", action)?;
        }
        Ok(())
    }
}

/// A sequence of actions, either a finished plan or a prefix under test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ActionPath {
    actions: Vec<Action>,
}

impl ActionPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.actions.iter().copied()
    }
}

impl From<Vec<Action>> for ActionPath {
    fn from(actions: Vec<Action>) -> Self {
        Self { actions }
    }
}

impl FromIterator<Action> for ActionPath {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

impl AsRef<[Action]> for ActionPath {
    fn as_ref(&self) -> &[Action] {
        &self.actions
    }
}

impl FromStr for ActionPath {
    type Err = RobbyError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim().chars().map(Action::from_symbol).collect()
    }
}

impl fmt::Display for ActionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in &self.actions {
            write!(f, "{}", action)?;
        }
        Ok(())
    }
}
