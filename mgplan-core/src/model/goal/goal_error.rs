use crate::model::space::GraspId;

use super::GoalId;

#[derive(thiserror::Error, Debug)]
pub enum GoalError {
    #[error("goal {0} is already registered; goal ids must be unique")]
    DuplicateGoal(GoalId),
    #[error("goal {0} is not registered")]
    UnknownGoal(GoalId),
    #[error("no goals registered for grasp {0}")]
    UnknownGrasp(GraspId),
    #[error("no goals are known; a cost-to-go heuristic cannot be synthesized")]
    NoGoals,
}
