//! Replaying candidate paths.
//!
//! [`PathValidator`] replays an action sequence from a starting snapshot and
//! decides whether it is *valid* (never crashes, never lets the battery
//! run empty, never returns to a position-and-contents combination it has
//! already been in) and whether it is *solved* (no cans left at the end).

use crate::{Action, Cell, Grid, Position, Rejection, TransitionRules, WorldState};
use std::collections::HashSet;
use std::fmt;

/// Why a replay stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The transition itself was illegal
    Rejected(Rejection),
    /// Robby ended the step outside the grid
    OffGrid,
    /// Robby ended the step on a wall
    OnWall,
    /// The step led back to a position and contents seen earlier on the path
    Cycle,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Rejected(rejection) => write!(f, "{}", rejection),
            InvalidReason::OffGrid => write!(f, "left the grid"),
            InvalidReason::OnWall => write!(f, "ended on a wall"),
            InvalidReason::Cycle => write!(f, "repeated an earlier state"),
        }
    }
}

/// The first step at which a path stopped being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathFailure {
    /// Zero-based index of the offending action
    pub step: usize,
    pub action: Action,
    pub reason: InvalidReason,
}

/// Outcome of replaying a path.
#[derive(Debug, Clone)]
pub struct PathReport {
    /// Set when the path is invalid
    pub failure: Option<PathFailure>,
    /// Last state reached before any failure
    pub final_state: WorldState,
    /// Battery level after each accepted step
    pub battery_trace: Vec<u32>,
}

impl PathReport {
    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }

    /// Valid and no cans left.
    pub fn is_solved(&self) -> bool {
        self.is_valid() && self.final_state.is_solved()
    }
}

/// Replays action sequences against a fixed starting snapshot.
///
/// # Examples
///
/// ```
/// use robby::{Grid, PathValidator, Position, WorldState};
///
/// let grid = Grid::parse(1, 2, "CC").unwrap();
/// let start = WorldState::new(grid, Position::new(0, 0), 7).unwrap();
/// let validator = PathValidator::new(&start);
///
/// let report = validator.replay(&"GEG".parse::<robby::ActionPath>().unwrap());
/// assert!(report.is_valid());
/// assert!(report.is_solved());
///
/// // walking east then back west revisits the start
/// assert!(!validator.is_valid(&"EW".parse::<robby::ActionPath>().unwrap()));
/// ```
#[derive(Debug, Clone)]
pub struct PathValidator<'a> {
    start: &'a WorldState,
    rules: TransitionRules,
}

impl<'a> PathValidator<'a> {
    pub fn new(start: &'a WorldState) -> Self {
        Self {
            start,
            rules: TransitionRules::default(),
        }
    }

    /// Replays under non-default transition rules.
    pub fn with_rules(mut self, rules: TransitionRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replays `path`, stopping at the first invalid step.
    pub fn replay(&self, path: impl AsRef<[Action]>) -> PathReport {
        let mut state = self.start.clone();
        let mut memory: HashSet<(Position, Grid)> = HashSet::new();
        memory.insert((state.position(), state.grid().clone()));
        let mut battery_trace = Vec::new();

        for (step, &action) in path.as_ref().iter().enumerate() {
            let fail = |reason| PathFailure {
                step,
                action,
                reason,
            };

            let next = match state.apply_action_with(action, self.rules) {
                Ok(next) => next,
                Err(rejection) => {
                    log::trace!("step {} ({}) rejected: {}", step, action, rejection);
                    return PathReport {
                        failure: Some(fail(InvalidReason::Rejected(rejection))),
                        final_state: state,
                        battery_trace,
                    };
                }
            };

            let reason = match next.cell_at(next.position()) {
                Err(_) => Some(InvalidReason::OffGrid),
                Ok(Cell::Wall) => Some(InvalidReason::OnWall),
                Ok(_) if !memory.insert((next.position(), next.grid().clone())) => {
                    Some(InvalidReason::Cycle)
                }
                Ok(_) => None,
            };
            if let Some(reason) = reason {
                log::trace!("step {} ({}) invalid: {}", step, action, reason);
                return PathReport {
                    failure: Some(fail(reason)),
                    final_state: state,
                    battery_trace,
                };
            }

            battery_trace.push(next.battery());
            state = next;
        }

        PathReport {
            failure: None,
            final_state: state,
            battery_trace,
        }
    }

    pub fn is_valid(&self, path: impl AsRef<[Action]>) -> bool {
        self.replay(path).is_valid()
    }

    pub fn is_solved(&self, path: impl AsRef<[Action]>) -> bool {
        self.replay(path).is_solved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActionPath;

    fn start(rows: usize, cols: usize, contents: &str, battery: u32) -> WorldState {
        let grid = Grid::parse(rows, cols, contents).unwrap();
        WorldState::new(grid, Position::new(0, 0), battery).unwrap()
    }

    fn path(s: &str) -> ActionPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_path_is_valid() {
        let s = start(1, 1, "C", 3);
        let report = PathValidator::new(&s).replay(ActionPath::new());
        assert!(report.is_valid());
        assert!(!report.is_solved());
        assert!(report.battery_trace.is_empty());
    }

    #[test]
    fn test_solved_path() {
        let s = start(1, 2, "CC", 7);
        let report = PathValidator::new(&s).replay(path("GEG"));
        assert!(report.is_solved());
        assert_eq!(report.battery_trace, vec![6, 5, 4]);
        assert_eq!(report.final_state.position(), Position::new(0, 1));
    }

    #[test]
    fn test_valid_but_unsolved() {
        let s = start(1, 2, "CC", 7);
        let report = PathValidator::new(&s).replay(path("GE"));
        assert!(report.is_valid());
        assert!(!report.is_solved());
    }

    #[test]
    fn test_crash_into_wall() {
        let s = start(1, 3, "CWC", 7);
        let report = PathValidator::new(&s).replay(path("GE"));
        assert_eq!(
            report.failure,
            Some(PathFailure {
                step: 1,
                action: Action::East,
                reason: InvalidReason::Rejected(Rejection::Blocked(Action::East)),
            })
        );
        assert_eq!(report.final_state.remaining_cans(), 1);
    }

    #[test]
    fn test_leaving_grid() {
        let s = start(1, 2, "CC", 7);
        let report = PathValidator::new(&s).replay(path("N"));
        assert_eq!(
            report.failure.map(|f| f.reason),
            Some(InvalidReason::Rejected(Rejection::OutOfBounds(Action::North)))
        );
    }

    #[test]
    fn test_grab_on_empty() {
        let s = start(1, 2, "EC", 7);
        assert!(!PathValidator::new(&s).is_valid(path("G")));
    }

    #[test]
    fn test_battery_runs_out() {
        let s = start(1, 3, "CEC", 2);
        let report = PathValidator::new(&s).replay(path("GEEG"));
        assert_eq!(
            report.failure,
            Some(PathFailure {
                step: 1,
                action: Action::East,
                reason: InvalidReason::Rejected(Rejection::BatteryExhausted),
            })
        );
        assert_eq!(report.battery_trace, vec![1]);
    }

    #[test]
    fn test_battery_pickup_keeps_path_alive() {
        let s = start(1, 3, "CBC", 3);
        let report = PathValidator::new(&s).replay(path("GEGEG"));
        assert!(report.is_solved());
        assert_eq!(report.battery_trace, vec![2, 1, 3, 2, 1]);
    }

    #[test]
    fn test_empty_battery_needs_opt_in() {
        let s = start(1, 3, "CBC", 2);
        assert!(!PathValidator::new(&s).is_valid(path("GEGEG")));

        let lenient = TransitionRules::default().allow_empty_battery(true);
        let report = PathValidator::new(&s).with_rules(lenient).replay(path("GEGEG"));
        assert!(report.is_solved());
        assert_eq!(report.battery_trace, vec![1, 0, 2, 1, 0]);
    }

    #[test]
    fn test_must_grab_before_leaving_a_can() {
        let s = start(1, 3, "CEC", 9);
        let rules = TransitionRules::default().must_grab_cans(true);
        let report = PathValidator::new(&s).with_rules(rules).replay(path("EEG"));
        assert_eq!(
            report.failure.map(|f| (f.step, f.reason)),
            Some((0, InvalidReason::Rejected(Rejection::MustGrab(Action::East))))
        );
        assert!(PathValidator::new(&s).with_rules(rules).is_solved(path("GEEG")));
    }

    #[test]
    fn test_cycle_is_invalid() {
        let s = start(1, 3, "EEC", 9);
        let report = PathValidator::new(&s).replay(path("EEWE"));
        assert_eq!(
            report.failure.map(|f| (f.step, f.reason)),
            Some((2, InvalidReason::Cycle))
        );
    }

    #[test]
    fn test_return_after_grab_is_not_a_cycle() {
        let s = start(1, 2, "CC", 9);
        // contents differ after the grab, so passing (0, 0) again is fine
        assert!(PathValidator::new(&s).is_valid(path("EGWG")));
        assert!(PathValidator::new(&s).is_solved(path("EGWG")));
    }
}
