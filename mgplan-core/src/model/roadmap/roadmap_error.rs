use crate::model::space::StateSpaceError;

use super::NodeId;

#[derive(thiserror::Error, Debug)]
pub enum RoadmapError {
    #[error("roadmap node {0} does not exist (or was deleted as invalid)")]
    UnknownNode(NodeId),
    #[error("no roadmap edge exists between nodes {0} and {1}")]
    UnknownEdge(NodeId, NodeId),
    #[error("configuration has dimension {found} but the roadmap's space has dimension {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("the roadmap failed due to a state space error: {source}")]
    StateSpaceFailure {
        #[from]
        source: StateSpaceError,
    },
    #[error("failure writing trace record: {0}")]
    TraceFailure(String),
}
