use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::model::space::{Configuration, GraspId};

/// identifies a goal; assigned by the caller, unique per planner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GoalId(pub u64);

impl Display for GoalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A desired terminal state: a configuration reached while holding the
/// object in a particular grasp, with a scalar preference (higher quality
/// is better).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub goal_id: GoalId,
    pub config: Configuration,
    pub gid: GraspId,
    pub quality: f64,
}

impl Goal {
    pub fn new(goal_id: GoalId, config: Configuration, gid: GraspId, quality: f64) -> Goal {
        Goal {
            goal_id,
            config,
            gid,
            quality,
        }
    }
}
