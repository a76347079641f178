//! # Planner Module
//!
//! The planner searches for the shortest sequence of actions that collects
//! every can in Robby's world without ever letting the battery run empty.
//!
//! ## Overview
//!
//! Planning works on an immutable [`WorldState`] snapshot, never on the live
//! [`World`](crate::World) used for display, so it can run on another thread
//! while the interactive layer keeps going. The search is breadth-first:
//!
//! 1. The frontier starts with the initial snapshot
//! 2. The head of the frontier is checked against the goal (no cans left)
//! 3. Otherwise each action of the alphabet is tried in order; illegal,
//!    cyclic and already-seen successors are dropped, the rest are queued
//! 4. The first solved state dequeued yields the plan, rebuilt from
//!    backpointers; an empty frontier means there is no plan
//!
//! Because every action costs one unit, the first solved state dequeued is
//! reached by a minimum number of actions, and the fixed alphabet order
//! makes the choice between equally short plans reproducible.
//!
//! ## Basic Usage
//!
//! ```
//! use robby::{Grid, Planner, Position, SearchOutcome, WorldState};
//!
//! let grid = Grid::parse(1, 2, "CC").unwrap();
//! let start = WorldState::new(grid, Position::new(0, 0), 7).unwrap();
//!
//! let planner = Planner::new("GNESW".parse().unwrap());
//! let report = planner.plan(&start).unwrap();
//!
//! assert_eq!(report.outcome.path().unwrap().to_string(), "GEG");
//!
//! // a wall between the two cans makes the level unsolvable
//! let walled = WorldState::new(Grid::parse(1, 3, "CWC").unwrap(), Position::new(0, 0), 7).unwrap();
//! assert_eq!(planner.plan(&walled).unwrap().outcome, SearchOutcome::Exhausted);
//! ```

use crate::search::{Limits, SearchContext};
use crate::{ActionAlphabet, Result, SearchReport, TransitionRules, WorldState};
use std::sync::atomic::AtomicBool;

/// Tuning knobs for the planner.
///
/// # Examples
///
/// ```
/// use robby::PlannerConfig;
///
/// let config = PlannerConfig::default()
///     .dedupe_on_battery(false)
///     .max_expansions(10_000)
///     .allow_empty_battery(true);
/// assert!(!config.includes_battery());
/// assert_eq!(config.expansion_limit(), Some(10_000));
/// assert!(config.rules().allows_empty_battery());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    dedupe_on_battery: bool,
    max_expansions: Option<usize>,
    rules: TransitionRules,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            dedupe_on_battery: true,
            max_expansions: None,
            rules: TransitionRules::default(),
        }
    }
}

impl PlannerConfig {
    /// Whether the battery level is part of a state's identity when
    /// discarding already-seen states.
    ///
    /// On by default: two arrivals at the same place with different charge
    /// are kept apart, which keeps the search complete. Turning it off
    /// shrinks the state space but may discard the better-charged arrival.
    pub fn dedupe_on_battery(mut self, include: bool) -> Self {
        self.dedupe_on_battery = include;
        self
    }

    /// Give up with `ExpansionLimit` after this many states are dequeued.
    pub fn max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }

    /// Accept plans whose battery reaches exactly zero after a step.
    ///
    /// Off by default, where the battery must stay positive throughout.
    pub fn allow_empty_battery(mut self, allow: bool) -> Self {
        self.rules = self.rules.allow_empty_battery(allow);
        self
    }

    /// Forbid walking off a can without grabbing it first.
    ///
    /// Off by default; turning it on can make plans longer.
    pub fn must_grab_cans(mut self, required: bool) -> Self {
        self.rules = self.rules.must_grab_cans(required);
        self
    }

    pub fn rules(&self) -> TransitionRules {
        self.rules
    }

    pub fn includes_battery(&self) -> bool {
        self.dedupe_on_battery
    }

    pub fn expansion_limit(&self) -> Option<usize> {
        self.max_expansions
    }
}

/// Breadth-first planner over an ordered action alphabet.
///
/// A planner holds no per-search state; every call to [`Planner::plan`]
/// builds its own frontier and discards it on return, so one planner can be
/// shared between threads.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    alphabet: ActionAlphabet,
    config: PlannerConfig,
}

impl Planner {
    /// Creates a planner with the default configuration.
    pub fn new(alphabet: ActionAlphabet) -> Self {
        Self {
            alphabet,
            config: PlannerConfig::default(),
        }
    }

    pub fn with_config(alphabet: ActionAlphabet, config: PlannerConfig) -> Self {
        Self { alphabet, config }
    }

    pub fn alphabet(&self) -> &ActionAlphabet {
        &self.alphabet
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Searches for a shortest plan from `initial`.
    ///
    /// # Returns
    ///
    /// * `Ok(report)` - with `SearchOutcome::Solved(path)` or
    ///   `SearchOutcome::Exhausted` when no valid plan exists
    /// * `Err(ExpansionLimit)` - if a configured expansion limit was hit
    pub fn plan(&self, initial: &WorldState) -> Result<SearchReport> {
        self.run(initial, None)
    }

    /// Like [`Planner::plan`], but polls `cancel` before each expansion and
    /// stops with `Cancelled` once it is set.
    pub fn plan_with_cancel(&self, initial: &WorldState, cancel: &AtomicBool) -> Result<SearchReport> {
        self.run(initial, Some(cancel))
    }

    fn run(&self, initial: &WorldState, cancel: Option<&AtomicBool>) -> Result<SearchReport> {
        log::info!(
            "Planning with alphabet {} from {} (battery {}/{})",
            self.alphabet,
            initial.encode(),
            initial.battery(),
            initial.capacity()
        );

        let limits = Limits {
            max_expansions: self.config.max_expansions,
            cancel,
        };
        let report = SearchContext::new(initial, self.config.dedupe_on_battery)
            .with_rules(self.config.rules)
            .run(&self.alphabet, limits)?;

        match report.outcome.path() {
            Some(path) => log::info!(
                "Found plan {} ({} actions) after {} expansions",
                path,
                path.len(),
                report.stats.expanded
            ),
            None => log::info!(
                "No plan exists; searched {} states",
                report.stats.expanded
            ),
        }
        log::debug!("Search statistics: {:?}", report.stats);

        Ok(report)
    }
}
