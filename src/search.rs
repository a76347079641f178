use crate::{
    Action, ActionAlphabet, ActionPath, Result, RobbyError, StateKey, TransitionRules, WorldState,
};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

/// Counters collected while searching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// States taken off the frontier, the goal state included
    pub expanded: usize,
    /// Successors added to the frontier
    pub generated: usize,
    /// Candidate successors discarded as illegal, cyclic or already seen
    pub pruned: usize,
    /// Largest frontier size observed
    pub max_frontier: usize,
}

/// How a search ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A shortest valid path that collects every can
    Solved(ActionPath),
    /// Every reachable state was examined and none is solved
    Exhausted,
}

impl SearchOutcome {
    pub fn path(&self) -> Option<&ActionPath> {
        match self {
            SearchOutcome::Solved(path) => Some(path),
            SearchOutcome::Exhausted => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, SearchOutcome::Solved(_))
    }
}

/// Outcome plus the counters gathered on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

/// A state in the search arena with a backpointer to the node it came from.
#[derive(Debug)]
struct Node {
    state: WorldState,
    /// Index of the parent node, `None` for the root
    parent: Option<usize>,
    /// Action that led here from the parent
    action: Option<Action>,
}

/// Stopping conditions imposed from outside the search.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Limits<'a> {
    pub max_expansions: Option<usize>,
    pub cancel: Option<&'a AtomicBool>,
}

/// Breadth-first search over world states.
///
/// Nodes live in an arena and point to their parent by index, so a plan is
/// rebuilt by walking backpointers once the goal is dequeued instead of
/// being carried along in every frontier entry.
pub(crate) struct SearchContext {
    nodes: Vec<Node>,
    frontier: VecDeque<usize>,
    seen: HashSet<StateKey>,
    include_battery: bool,
    rules: TransitionRules,
    stats: SearchStats,
}

impl SearchContext {
    pub fn new(initial: &WorldState, include_battery: bool) -> Self {
        let mut seen = HashSet::new();
        seen.insert(initial.key(include_battery));

        Self {
            nodes: vec![Node {
                state: initial.clone(),
                parent: None,
                action: None,
            }],
            frontier: VecDeque::from([0]),
            seen,
            include_battery,
            rules: TransitionRules::default(),
            stats: SearchStats {
                max_frontier: 1,
                ..SearchStats::default()
            },
        }
    }

    pub fn with_rules(mut self, rules: TransitionRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn run(mut self, alphabet: &ActionAlphabet, limits: Limits<'_>) -> Result<SearchReport> {
        loop {
            if limits.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                log::warn!("Search cancelled after {} expansions", self.stats.expanded);
                return Err(RobbyError::Cancelled {
                    expanded: self.stats.expanded,
                });
            }
            if let Some(limit) = limits.max_expansions {
                if self.stats.expanded >= limit {
                    log::warn!("Search hit its expansion limit of {}", limit);
                    return Err(RobbyError::ExpansionLimit(limit));
                }
            }

            let Some(idx) = self.frontier.pop_front() else {
                return Ok(SearchReport {
                    outcome: SearchOutcome::Exhausted,
                    stats: self.stats,
                });
            };
            self.stats.expanded += 1;

            if self.nodes[idx].state.is_solved() {
                let path = self.reconstruct_path(idx);
                return Ok(SearchReport {
                    outcome: SearchOutcome::Solved(path),
                    stats: self.stats,
                });
            }

            self.expand(idx, alphabet);
        }
    }

    /// Queues every admissible successor of a node, in alphabet order.
    fn expand(&mut self, idx: usize, alphabet: &ActionAlphabet) {
        log::trace!(
            "Expanding {} (battery {})",
            self.nodes[idx].state.encode(),
            self.nodes[idx].state.battery()
        );

        for action in alphabet.iter() {
            let next = match self.nodes[idx].state.apply_action_with(action, self.rules) {
                Ok(next) => next,
                Err(rejection) => {
                    log::trace!("  {}: {}", action, rejection);
                    self.stats.pruned += 1;
                    continue;
                }
            };

            if self.revisits(idx, &next) {
                log::trace!("  {}: cycle", action);
                self.stats.pruned += 1;
                continue;
            }
            if !self.seen.insert(next.key(self.include_battery)) {
                self.stats.pruned += 1;
                continue;
            }

            self.nodes.push(Node {
                state: next,
                parent: Some(idx),
                action: Some(action),
            });
            self.frontier.push_back(self.nodes.len() - 1);
            self.stats.generated += 1;
        }

        self.stats.max_frontier = self.stats.max_frontier.max(self.frontier.len());
    }

    /// Whether `candidate` repeats the position and contents of a node on the
    /// path ending at `idx`.
    ///
    /// Grid contents only ever lose items along a path, so the walk stops at
    /// the first ancestor whose contents differ from the candidate's.
    fn revisits(&self, idx: usize, candidate: &WorldState) -> bool {
        let mut current = Some(idx);
        while let Some(i) = current {
            let node = &self.nodes[i];
            if node.state.same_place(candidate) {
                return true;
            }
            if node.state.grid() != candidate.grid() {
                return false;
            }
            current = node.parent;
        }
        false
    }

    /// Rebuilds the action sequence from the root to the given node.
    fn reconstruct_path(&self, idx: usize) -> ActionPath {
        let mut actions = Vec::new();
        let mut current = Some(idx);

        while let Some(i) = current {
            let node = &self.nodes[i];
            if let Some(action) = node.action {
                actions.push(action);
            }
            current = node.parent;
        }

        actions.reverse();
        ActionPath::from(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Grid, Position};

    fn start(rows: usize, cols: usize, contents: &str, battery: u32) -> WorldState {
        let grid = Grid::parse(rows, cols, contents).unwrap();
        WorldState::new(grid, Position::new(0, 0), battery).unwrap()
    }

    fn search(initial: &WorldState, alphabet: &str) -> SearchReport {
        SearchContext::new(initial, true)
            .run(&alphabet.parse().unwrap(), Limits::default())
            .unwrap()
    }

    #[test]
    fn test_already_solved() {
        let report = search(&start(1, 2, "EE", 3), "GNESW");
        assert_eq!(report.outcome, SearchOutcome::Solved(ActionPath::new()));
        assert_eq!(report.stats.expanded, 1);
        assert_eq!(report.stats.generated, 0);
    }

    #[test]
    fn test_reconstructs_actions_in_order() {
        let report = search(&start(1, 3, "EEC", 9), "GNESW");
        assert_eq!(report.outcome.path().unwrap().to_string(), "EEG");
    }

    #[test]
    fn test_alphabet_order_breaks_ties() {
        // cans at (0, 1) and (1, 0): either can first takes five actions
        let initial = start(2, 2, "ECCE", 9);
        let east_first = search(&initial, "GESNW");
        let south_first = search(&initial, "GSENW");
        assert_eq!(east_first.outcome.path().unwrap().len(), 5);
        assert!(east_first.outcome.path().unwrap().to_string().starts_with("EG"));
        assert!(south_first.outcome.path().unwrap().to_string().starts_with("SG"));
    }

    #[test]
    fn test_restricted_alphabet() {
        // without East the can is unreachable
        let report = search(&start(1, 2, "EC", 9), "GNSW");
        assert_eq!(report.outcome, SearchOutcome::Exhausted);
        assert!(report.stats.pruned > 0);
    }

    #[test]
    fn test_revisit_check_spans_only_unchanged_contents() {
        let initial = start(1, 2, "CC", 9);
        let mut ctx = SearchContext::new(&initial, true);
        ctx.expand(0, &ActionAlphabet::default());
        // node 1 is G, node 2 is E
        let east = ctx.nodes[2].state.clone();
        let back_west = east.apply_action(Action::West).unwrap();
        assert!(ctx.revisits(2, &back_west));

        let grabbed = ctx.nodes[1].state.clone();
        let east_after_grab = grabbed.apply_action(Action::East).unwrap();
        let west_again = east_after_grab.apply_action(Action::West).unwrap();
        assert!(!ctx.revisits(1, &east_after_grab));
        assert!(ctx.revisits(1, &west_again));
    }

    #[test]
    fn test_rules_shape_the_plan() {
        // leaving the middle can first is shortest unless cans must be grabbed on the spot
        let initial = WorldState::new(Grid::parse(1, 3, "CCC").unwrap(), Position::new(0, 1), 9)
            .unwrap();
        let alphabet: ActionAlphabet = "EWG".parse().unwrap();

        let free = SearchContext::new(&initial, true)
            .run(&alphabet, Limits::default())
            .unwrap();
        assert_eq!(free.outcome.path().unwrap().to_string(), "EGWGWG");

        let strict = SearchContext::new(&initial, true)
            .with_rules(TransitionRules::default().must_grab_cans(true))
            .run(&alphabet, Limits::default())
            .unwrap();
        assert_eq!(strict.outcome.path().unwrap().to_string(), "GEGWWG");
    }

    #[test]
    fn test_cancel_flag() {
        let flag = AtomicBool::new(true);
        let result = SearchContext::new(&start(1, 2, "EC", 9), true).run(
            &ActionAlphabet::default(),
            Limits {
                max_expansions: None,
                cancel: Some(&flag),
            },
        );
        assert!(matches!(result, Err(RobbyError::Cancelled { expanded: 0 })));
    }

    #[test]
    fn test_expansion_limit() {
        let result = SearchContext::new(&start(1, 4, "EEEC", 9), true).run(
            &ActionAlphabet::default(),
            Limits {
                max_expansions: Some(2),
                cancel: None,
            },
        );
        assert!(matches!(result, Err(RobbyError::ExpansionLimit(2))));
    }
}
