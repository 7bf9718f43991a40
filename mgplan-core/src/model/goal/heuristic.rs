use std::sync::Arc;

use indexmap::IndexMap;

use crate::model::space::{Configuration, GraspId, StateSpace};
use crate::model::unit::Cost;

use super::{GoalError, GoalId, GoalSet};

/// floor on the goal-quality range so the scaled trade-off weight stays
/// finite when all goals share one quality
pub const MIN_QUALITY_RANGE: f64 = 1e-6;

#[derive(Debug, Clone)]
struct GoalEntry {
    goal_id: GoalId,
    gid: GraspId,
    config: Configuration,
    quality: f64,
}

/// Multi-goal cost-to-go heuristic. The distance to a goal blends the
/// state-space lower bound with a quality penalty: `d(a, g.config) +
/// λ'(q_max − g.quality)` where `λ' = λ / max(q_max − q_min, ε)`. One goal
/// table serves grasp-agnostic queries, per-grasp tables serve conditional
/// ones. As long as `d` lower-bounds true path cost the heuristic is
/// admissible.
pub struct MultiGoalHeuristic {
    space: Arc<dyn StateSpace>,
    lambda_scaled: f64,
    q_max: f64,
    entries: Vec<GoalEntry>,
    per_grasp: IndexMap<GraspId, Vec<usize>>,
}

impl MultiGoalHeuristic {
    /// builds the heuristic over the current goal set. an empty goal set is
    /// a programmer error: no cost-to-go can be synthesized.
    pub fn build(
        space: Arc<dyn StateSpace>,
        goals: &GoalSet,
        lambda: f64,
    ) -> Result<MultiGoalHeuristic, GoalError> {
        let (q_min, q_max) = goals.quality_bounds().ok_or(GoalError::NoGoals)?;
        let range = (q_max - q_min).max(MIN_QUALITY_RANGE);
        let lambda_scaled = lambda / range;
        let mut entries = Vec::with_capacity(goals.len());
        let mut per_grasp: IndexMap<GraspId, Vec<usize>> = IndexMap::new();
        for goal in goals.iter() {
            per_grasp.entry(goal.gid).or_default().push(entries.len());
            entries.push(GoalEntry {
                goal_id: goal.goal_id,
                gid: goal.gid,
                config: goal.config.clone(),
                quality: goal.quality,
            });
        }
        Ok(MultiGoalHeuristic {
            space,
            lambda_scaled,
            q_max,
            entries,
            per_grasp,
        })
    }

    pub fn lambda_scaled(&self) -> f64 {
        self.lambda_scaled
    }

    pub fn q_max(&self) -> f64 {
        self.q_max
    }

    /// the terminal penalty paid on arrival at a goal of the given quality.
    pub fn goal_cost(&self, quality: f64) -> Cost {
        Cost::new(self.lambda_scaled * (self.q_max - quality))
    }

    fn goal_distance(&self, a: &[f64], entry: &GoalEntry) -> Cost {
        Cost::new(
            self.space.distance(a, &entry.config)
                + self.lambda_scaled * (self.q_max - entry.quality),
        )
    }

    /// cost-to-go from `a` to the nearest goal under the blended distance.
    pub fn cost_to_go(&self, a: &[f64]) -> Cost {
        self.entries
            .iter()
            .map(|e| self.goal_distance(a, e))
            .min()
            .unwrap_or(Cost::INFINITY)
    }

    /// cost-to-go restricted to goals of one grasp. a grasp with no
    /// remaining goals has no reachable goal, which is infinite, not an
    /// error: grasps are pruned as their goals are removed.
    pub fn cost_to_go_for_grasp(&self, a: &[f64], gid: GraspId) -> Cost {
        match self.per_grasp.get(&gid) {
            None => Cost::INFINITY,
            Some(indices) => indices
                .iter()
                .map(|i| self.goal_distance(a, &self.entries[*i]))
                .min()
                .unwrap_or(Cost::INFINITY),
        }
    }

    /// the nearest goal's id from `a`, used for diagnostics.
    pub fn nearest_goal(&self, a: &[f64]) -> Option<GoalId> {
        self.entries
            .iter()
            .min_by_key(|e| self.goal_distance(a, e))
            .map(|e| e.goal_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cost::EdgeCostIntegrator;
    use crate::model::goal::Goal;
    use crate::model::roadmap::Roadmap;
    use crate::testing::mock::BoxStateSpace;
    use approx::assert_relative_eq;

    fn goal_set(goals: Vec<Goal>) -> (Arc<BoxStateSpace>, GoalSet) {
        let space = Arc::new(BoxStateSpace::unit_square());
        let mut roadmap = Roadmap::new(space.clone(), EdgeCostIntegrator::default(), 0);
        let mut set = GoalSet::default();
        for g in goals {
            set.add_goal(g, &mut roadmap).unwrap();
        }
        (space, set)
    }

    #[test]
    fn test_no_goals_fails_fast() {
        let space = Arc::new(BoxStateSpace::unit_square());
        let result = MultiGoalHeuristic::build(space, &GoalSet::default(), 1.0);
        assert!(matches!(result, Err(GoalError::NoGoals)));
    }

    #[test]
    fn test_quality_penalty_scaling() {
        let (space, set) = goal_set(vec![
            Goal::new(GoalId(1), vec![0.9, 0.9], GraspId(0), 0.0),
            Goal::new(GoalId(2), vec![0.5, 0.5], GraspId(0), 2.0),
        ]);
        let h = MultiGoalHeuristic::build(space, &set, 1.0).unwrap();
        // Δq = 2, λ' = 0.5, q_max = 2
        assert_relative_eq!(h.lambda_scaled(), 0.5);
        assert_eq!(h.goal_cost(2.0), Cost::ZERO);
        assert_relative_eq!(h.goal_cost(0.0).as_f64(), 1.0);
    }

    #[test]
    fn test_cost_to_go_picks_blended_nearest() {
        let (space, set) = goal_set(vec![
            Goal::new(GoalId(1), vec![0.2, 0.1], GraspId(0), 0.0),
            Goal::new(GoalId(2), vec![0.9, 0.9], GraspId(1), 1.0),
        ]);
        let h = MultiGoalHeuristic::build(space, &set, 1.0).unwrap();
        // from the corner near goal 1, the quality penalty (λ' = 1) still
        // makes goal 1 the blended nearest
        let a = [0.1, 0.1];
        let d1 = 0.1 + 1.0;
        assert_relative_eq!(h.cost_to_go(&a).as_f64(), d1, epsilon = 1e-12);
        assert_eq!(h.nearest_goal(&a), Some(GoalId(1)));
        // conditional on grasp 1 only its goal counts
        let d2 = ((0.8f64).powi(2) * 2.0).sqrt();
        assert_relative_eq!(
            h.cost_to_go_for_grasp(&a, GraspId(1)).as_f64(),
            d2,
            epsilon = 1e-12
        );
        assert_eq!(h.cost_to_go_for_grasp(&a, GraspId(9)), Cost::INFINITY);
    }

    #[test]
    fn test_single_quality_range_is_floored() {
        let (space, set) = goal_set(vec![Goal::new(GoalId(1), vec![0.5, 0.5], GraspId(0), 3.0)]);
        let h = MultiGoalHeuristic::build(space, &set, 1.0).unwrap();
        assert!(h.lambda_scaled().is_finite());
        assert_eq!(h.goal_cost(3.0), Cost::ZERO);
    }
}
