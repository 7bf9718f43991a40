use crate::model::{goal::GoalError, roadmap::RoadmapError, space::StateSpaceError};

use super::SearchVertexId;

#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("the search failed due to a roadmap error: {source}")]
    RoadmapFailure {
        #[from]
        source: RoadmapError,
    },
    #[error("the search failed due to a goal model error: {source}")]
    GoalFailure {
        #[from]
        source: GoalError,
    },
    #[error("the search failed due to a state space error: {source}")]
    StateSpaceFailure {
        #[from]
        source: StateSpaceError,
    },
    #[error("search vertex {0} is not known to this graph")]
    UnknownVertex(SearchVertexId),
    #[error("internal error due to search logic: {0}")]
    InternalError(String),
}
