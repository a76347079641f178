mod action;
mod error;
mod grid;
mod level;
mod planner;
mod search;
mod validator;
mod visualizer;
mod world;
mod world_state;

pub use action::{Action, ActionAlphabet, ActionPath};
pub use error::{Result, RobbyError};
pub use grid::{Cell, Grid, Position};
pub use level::Level;
pub use planner::{Planner, PlannerConfig};
pub use search::{SearchOutcome, SearchReport, SearchStats};
pub use validator::{InvalidReason, PathFailure, PathReport, PathValidator};
pub use visualizer::PlanVisualizer;
pub use world::{
    Percept, StepOutcome, World, COST_PER_ACTION, COST_PER_CRASH, SCORE_PER_BATTERY,
    SCORE_PER_CAN,
};
pub use world_state::{Rejection, StateKey, TransitionRules, WorldState};
