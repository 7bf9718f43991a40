use crate::model::goal::GoalId;
use crate::model::space::Configuration;
use crate::model::unit::Cost;

/// A planned transport motion: the winning goal, the configuration path
/// from the start to it, and the minimized objective (path cost plus
/// quality penalty).
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub goal_id: GoalId,
    pub path: Vec<Configuration>,
    pub cost: Cost,
}
