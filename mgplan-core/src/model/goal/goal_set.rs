use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

use crate::model::roadmap::{NodeId, Roadmap};
use crate::model::space::GraspId;

use super::{Goal, GoalError, GoalId};

/// The registered goals, cross-linked into the roadmap: every goal's
/// configuration is inserted as a roadmap node on registration, and the
/// goal ↔ node association is maintained both ways. Removal only detaches
/// the association; the roadmap node stays in place for other callers.
#[derive(Default)]
pub struct GoalSet {
    goals: IndexMap<GoalId, Goal>,
    goal_nodes: HashMap<GoalId, NodeId>,
    node_goals: HashMap<NodeId, Vec<GoalId>>,
}

impl GoalSet {
    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Goal> {
        self.goals.values()
    }

    pub fn goal(&self, goal_id: GoalId) -> Result<&Goal, GoalError> {
        self.goals
            .get(&goal_id)
            .ok_or(GoalError::UnknownGoal(goal_id))
    }

    pub fn node_of(&self, goal_id: GoalId) -> Option<NodeId> {
        self.goal_nodes.get(&goal_id).copied()
    }

    /// goal ids attached to a roadmap node; empty for non-goal nodes.
    pub fn goals_at(&self, uid: NodeId) -> &[GoalId] {
        self.node_goals
            .get(&uid)
            .map(|v| v.as_slice())
            .unwrap_or_default()
    }

    /// the best-quality goal at this node whose grasp is `gid`, if any.
    /// grasp-conditional validity of the node is the caller's concern.
    pub fn goal_at(&self, uid: NodeId, gid: GraspId) -> Option<&Goal> {
        self.goals_at(uid)
            .iter()
            .filter_map(|id| self.goals.get(id))
            .filter(|g| g.gid == gid)
            .max_by(|a, b| a.quality.total_cmp(&b.quality))
    }

    /// the distinct grasp ids referenced by current goals, in insertion
    /// order.
    pub fn grasp_ids(&self) -> Vec<GraspId> {
        self.goals
            .values()
            .map(|g| g.gid)
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    /// (q_min, q_max) over current goals.
    pub fn quality_bounds(&self) -> Option<(f64, f64)> {
        self.goals
            .values()
            .map(|g| g.quality)
            .minmax_by(f64::total_cmp)
            .into_option()
    }

    /// registers a goal, inserting its configuration as a roadmap node.
    /// duplicate ids are a programmer error.
    pub fn add_goal(&mut self, goal: Goal, roadmap: &mut Roadmap) -> Result<NodeId, GoalError> {
        if self.goals.contains_key(&goal.goal_id) {
            return Err(GoalError::DuplicateGoal(goal.goal_id));
        }
        let uid = roadmap.add_node(goal.config.clone());
        self.goal_nodes.insert(goal.goal_id, uid);
        self.node_goals.entry(uid).or_default().push(goal.goal_id);
        self.goals.insert(goal.goal_id, goal);
        Ok(uid)
    }

    /// detaches the listed goals. all ids are validated before anything is
    /// removed, so an unknown id leaves the set untouched. returns the
    /// removed (goal, node, grasp) associations.
    pub fn remove_goals(
        &mut self,
        goal_ids: &[GoalId],
    ) -> Result<Vec<(GoalId, NodeId, GraspId)>, GoalError> {
        for id in goal_ids {
            if !self.goals.contains_key(id) {
                return Err(GoalError::UnknownGoal(*id));
            }
        }
        let mut removed = Vec::with_capacity(goal_ids.len());
        for id in goal_ids {
            let goal = match self.goals.shift_remove(id) {
                None => continue, // duplicate id in the request
                Some(g) => g,
            };
            if let Some(uid) = self.goal_nodes.remove(id) {
                if let Some(ids) = self.node_goals.get_mut(&uid) {
                    ids.retain(|g| g != id);
                    if ids.is_empty() {
                        self.node_goals.remove(&uid);
                    }
                }
                removed.push((*id, uid, goal.gid));
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cost::EdgeCostIntegrator;
    use crate::testing::mock::BoxStateSpace;
    use std::sync::Arc;

    fn empty_roadmap() -> Roadmap {
        Roadmap::new(
            Arc::new(BoxStateSpace::unit_square()),
            EdgeCostIntegrator::default(),
            0,
        )
    }

    fn goal(id: u64, gid: u64, quality: f64) -> Goal {
        Goal::new(GoalId(id), vec![0.5, 0.5], GraspId(gid), quality)
    }

    #[test]
    fn test_duplicate_goal_id_rejected() {
        let mut roadmap = empty_roadmap();
        let mut goals = GoalSet::default();
        goals.add_goal(goal(1, 0, 0.0), &mut roadmap).unwrap();
        let result = goals.add_goal(goal(1, 0, 1.0), &mut roadmap);
        assert!(matches!(result, Err(GoalError::DuplicateGoal(GoalId(1)))));
    }

    #[test]
    fn test_unknown_goal_removal_rejected_atomically() {
        let mut roadmap = empty_roadmap();
        let mut goals = GoalSet::default();
        goals.add_goal(goal(1, 0, 0.0), &mut roadmap).unwrap();
        let result = goals.remove_goals(&[GoalId(1), GoalId(9)]);
        assert!(matches!(result, Err(GoalError::UnknownGoal(GoalId(9)))));
        assert_eq!(goals.len(), 1);
    }

    #[test]
    fn test_add_then_remove_restores_state() {
        let mut roadmap = empty_roadmap();
        let mut goals = GoalSet::default();
        let uid = goals.add_goal(goal(1, 0, 0.0), &mut roadmap).unwrap();
        let removed = goals.remove_goals(&[GoalId(1)]).unwrap();
        assert_eq!(removed, vec![(GoalId(1), uid, GraspId(0))]);
        assert!(goals.is_empty());
        assert!(goals.goals_at(uid).is_empty());
        // the roadmap node survives goal removal
        assert!(roadmap.contains(uid));
    }

    #[test]
    fn test_goal_at_prefers_best_quality() {
        let mut roadmap = empty_roadmap();
        let mut goals = GoalSet::default();
        let uid_a = goals.add_goal(goal(1, 0, 0.2), &mut roadmap).unwrap();
        goals.add_goal(goal(2, 1, 0.9), &mut roadmap).unwrap();
        assert_eq!(goals.goal_at(uid_a, GraspId(0)).unwrap().goal_id, GoalId(1));
        assert!(goals.goal_at(uid_a, GraspId(1)).is_none());
        assert_eq!(goals.grasp_ids(), vec![GraspId(0), GraspId(1)]);
        assert_eq!(goals.quality_bounds(), Some((0.2, 0.9)));
    }
}
