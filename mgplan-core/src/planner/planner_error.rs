use crate::algorithm::search::SearchError;
use crate::model::{goal::GoalError, roadmap::RoadmapError, space::StateSpaceError};

#[derive(thiserror::Error, Debug)]
pub enum PlannerError {
    #[error("failure building planner: {0}")]
    BuildError(String),
    #[error("invalid planner configuration: {0}")]
    InvalidConfiguration(String),
    #[error("the planner failed due to a search error: {source}")]
    SearchFailure {
        #[from]
        source: SearchError,
    },
    #[error("the planner failed due to a goal model error: {source}")]
    GoalFailure {
        #[from]
        source: GoalError,
    },
    #[error("the planner failed due to a roadmap error: {source}")]
    RoadmapFailure {
        #[from]
        source: RoadmapError,
    },
    #[error("the planner failed due to a state space error: {source}")]
    StateSpaceFailure {
        #[from]
        source: StateSpaceError,
    },
    #[error("internal planner error: {0}")]
    InternalError(String),
}
