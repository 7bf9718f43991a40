mod goal;
mod goal_error;
mod goal_set;
mod heuristic;

pub use goal::{Goal, GoalId};
pub use goal_error::GoalError;
pub use goal_set::GoalSet;
pub use heuristic::{MultiGoalHeuristic, MIN_QUALITY_RANGE};
