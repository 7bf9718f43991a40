use super::GraspId;

#[derive(thiserror::Error, Debug)]
pub enum StateSpaceError {
    #[error("invalid joint limits: {0}")]
    InvalidBounds(String),
    #[error("configuration has dimension {found} but the space has dimension {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("grasp {0} is not registered with this state space")]
    UnknownGrasp(GraspId),
    #[error("grasp {0} is already registered with this state space")]
    DuplicateGrasp(GraspId),
    #[error("operation is not supported by this state space: {0}")]
    UnsupportedOperation(String),
    #[error("internal state space error: {0}")]
    InternalError(String),
}
