use std::sync::Arc;

use crate::algorithm::search::lpa_star::LpaStarSearch;
use crate::algorithm::search::{
    EdgeChange, FoldedGraph, GraphLayer, MultiGraspGraph, SearchGraph, SearchResult,
    SingleGraspGraph, VertexKind, VertexTable,
};
use crate::model::cost::EdgeCostIntegrator;
use crate::model::goal::{Goal, GoalError, GoalId, GoalSet, MultiGoalHeuristic};
use crate::model::roadmap::{NodeId, Roadmap, TraceSink};
use crate::model::space::{BinaryCostFallback, Configuration, GraspId, StateSpace};
use crate::model::unit::Cost;

use super::{GraphType, PlannerConfig, PlannerError, Solution};

/// The multi-grasp motion planner: one shared roadmap, a goal set
/// cross-linked into it, a quality-blended cost-to-go heuristic, and a
/// retained incremental search over the configured logical graph.
///
/// Goals may be added and removed between `plan` invocations, never during
/// one. With an LPA*-family algorithm, search state survives goal-set
/// changes and densification rounds; replanning pays only for what changed.
pub struct MultiGraspPlanner {
    space: Arc<dyn StateSpace>,
    config: PlannerConfig,
    roadmap: Roadmap,
    goals: GoalSet,
    heuristic: Option<MultiGoalHeuristic>,
    /// the stationary folded graph keeps the heuristic it was first built
    /// with until a goal-set change forces a fresh search
    frozen_heuristic: Option<MultiGoalHeuristic>,
    table: VertexTable,
    search: LpaStarSearch,
    start_uid: NodeId,
    active_grasp: Option<GraspId>,
    goals_dirty: bool,
    removed_lifts: Vec<(NodeId, GraspId)>,
    added_lifts: Vec<(NodeId, GraspId)>,
}

impl MultiGraspPlanner {
    pub fn new(
        space: Arc<dyn StateSpace>,
        start_config: Configuration,
        config: PlannerConfig,
    ) -> Result<MultiGraspPlanner, PlannerError> {
        config.validate()?;
        let space: Arc<dyn StateSpace> = if space.supports_clearance() {
            space
        } else {
            log::warn!(
                "state space does not support clearance queries; substituting binary validity costs"
            );
            Arc::new(BinaryCostFallback::new(space))
        };
        {
            let info = space.space_information();
            if start_config.len() != info.dimension() {
                return Err(PlannerError::BuildError(format!(
                    "start configuration has dimension {} but the space has dimension {}",
                    start_config.len(),
                    info.dimension()
                )));
            }
            if !info.contains(&start_config) {
                return Err(PlannerError::BuildError(
                    "start configuration lies outside the joint limits".to_string(),
                ));
            }
        }
        if config.extreme_lazy {
            log::debug!("extreme_lazy is reserved and ignored");
        }
        let integrator = EdgeCostIntegrator::new(config.step_size);
        let mut roadmap = Roadmap::new(Arc::clone(&space), integrator, config.halton_offset);
        let start_uid = roadmap.add_node(start_config);
        let search = LpaStarSearch::new(config.algo_type.policy())
            .with_termination(config.termination.clone());
        Ok(MultiGraspPlanner {
            space,
            config,
            roadmap,
            goals: GoalSet::default(),
            heuristic: None,
            frozen_heuristic: None,
            table: VertexTable::default(),
            search,
            start_uid,
            active_grasp: None,
            goals_dirty: false,
            removed_lifts: Vec::new(),
            added_lifts: Vec::new(),
        })
    }

    pub fn set_trace(&mut self, sink: TraceSink) {
        self.roadmap.set_trace(sink);
    }

    pub fn roadmap(&self) -> &Roadmap {
        &self.roadmap
    }

    pub fn goals(&self) -> &GoalSet {
        &self.goals
    }

    /// cumulative vertex expansions across this planner's searches.
    pub fn expansions(&self) -> u64 {
        self.search.expansions()
    }

    pub fn search_result(&self) -> &SearchResult {
        self.search.result()
    }

    pub fn add_goal(&mut self, goal: Goal) -> Result<(), PlannerError> {
        let dimension = self.space.space_information().dimension();
        if goal.config.len() != dimension {
            return Err(PlannerError::InvalidConfiguration(format!(
                "goal {} has dimension {} but the space has dimension {}",
                goal.goal_id,
                goal.config.len(),
                dimension
            )));
        }
        let gid = goal.gid;
        let uid = self.goals.add_goal(goal, &mut self.roadmap)?;
        self.added_lifts.push((uid, gid));
        self.goals_dirty = true;
        Ok(())
    }

    pub fn remove_goals(&mut self, goal_ids: &[GoalId]) -> Result<(), PlannerError> {
        let removed = self.goals.remove_goals(goal_ids)?;
        for (_, uid, gid) in removed {
            self.removed_lifts.push((uid, gid));
        }
        self.goals_dirty = true;
        Ok(())
    }

    /// plans a path from the start to the best reachable goal. `Ok(None)`
    /// means the query is infeasible on the roadmap the configured
    /// densification budget produces; planning with no goals registered is
    /// a programmer error.
    pub fn plan(&mut self) -> Result<Option<Solution>, PlannerError> {
        if self.goals.is_empty() {
            return Err(GoalError::NoGoals.into());
        }
        let dirty = self.goals_dirty;
        self.goals_dirty = false;
        if dirty || self.heuristic.is_none() {
            self.heuristic = Some(MultiGoalHeuristic::build(
                Arc::clone(&self.space),
                &self.goals,
                self.config.lambda,
            )?);
        }
        let resolved_grasp = match self.config.graph_type {
            GraphType::SingleGrasp => {
                let gid = self.resolve_single_grasp()?;
                if self.active_grasp.is_some() && self.active_grasp != Some(gid) {
                    self.search.reset();
                }
                self.active_grasp = Some(gid);
                Some(gid)
            }
            _ => None,
        };
        if self.config.graph_type == GraphType::FoldedStationary
            && (dirty || self.frozen_heuristic.is_none())
        {
            // stationary folded heuristics cannot absorb goal changes
            self.search.reset();
            self.frozen_heuristic = Some(MultiGoalHeuristic::build(
                Arc::clone(&self.space),
                &self.goals,
                self.config.lambda,
            )?);
        }
        let removed = std::mem::take(&mut self.removed_lifts);
        let added = std::mem::take(&mut self.added_lifts);
        let incremental = self.config.algo_type.is_incremental();
        let mut reconcile = dirty
            && incremental
            && self.search.start().is_some()
            && self.config.graph_type != GraphType::FoldedStationary;
        let mut lift_events = if reconcile {
            self.goal_change_events(&removed, &added)
        } else {
            Vec::new()
        };

        for attempt in 0..=self.config.max_batches {
            if attempt > 0 || self.roadmap.num_nodes() < self.config.batch_size {
                self.roadmap.densify(self.config.batch_size);
            }
            let mut events = std::mem::take(&mut lift_events);
            let new_edges = self.roadmap.take_new_edges();
            if incremental && self.search.start().is_some() {
                events.extend(self.new_edge_events(&new_edges, resolved_grasp));
            }
            let reconcile_now = std::mem::take(&mut reconcile);

            let start_uid = self.start_uid;
            let MultiGraspPlanner {
                config,
                roadmap,
                goals,
                heuristic,
                frozen_heuristic,
                table,
                search,
                ..
            } = self;
            let heuristic_ref = match config.graph_type {
                GraphType::FoldedStationary => frozen_heuristic.as_ref(),
                _ => heuristic.as_ref(),
            }
            .ok_or_else(|| PlannerError::InternalError("heuristic not built".to_string()))?;
            let mut graph: Box<dyn SearchGraph + '_> = match config.graph_type {
                GraphType::SingleGrasp => {
                    let gid = resolved_grasp.ok_or_else(|| {
                        PlannerError::InternalError("single-grasp graph without a grasp".to_string())
                    })?;
                    Box::new(SingleGraspGraph::new(
                        roadmap,
                        goals,
                        heuristic_ref,
                        table,
                        gid,
                        start_uid,
                    ))
                }
                GraphType::MultiGrasp => Box::new(MultiGraspGraph::new(
                    roadmap,
                    goals,
                    heuristic_ref,
                    table,
                    start_uid,
                )),
                GraphType::FoldedStationary | GraphType::FoldedDynamic => Box::new(
                    FoldedGraph::new(roadmap, goals, heuristic_ref, table, start_uid),
                ),
            };
            if !events.is_empty() {
                search.update_edges(graph.as_mut(), events)?;
            }
            if reconcile_now {
                search.refresh_heuristics(graph.as_mut())?;
                search.rescan_goals(graph.as_mut())?;
            }
            config.algo_type.run(search, graph.as_mut())?;
            let result = *search.result();
            let steps = if result.solved {
                let vertices = search.extract_path()?;
                let mut steps = Vec::with_capacity(vertices.len());
                for v in vertices {
                    steps.push(graph.grasp_roadmap_id(v)?);
                }
                Some(steps)
            } else {
                None
            };
            drop(graph);
            if let Some(steps) = steps {
                return self.assemble_solution(&steps, &result).map(Some);
            }
            if result.interrupted {
                log::warn!("plan interrupted before any solution was certified");
                return Ok(None);
            }
        }
        log::info!(
            "no solution exists on the current roadmap ({} nodes)",
            self.roadmap.num_nodes()
        );
        Ok(None)
    }

    fn resolve_single_grasp(&self) -> Result<GraspId, PlannerError> {
        if let Some(gid) = self.config.grasp {
            return Ok(gid);
        }
        let grasps = self.goals.grasp_ids();
        match grasps.as_slice() {
            [single] => Ok(*single),
            _ => Err(PlannerError::InvalidConfiguration(format!(
                "a single_grasp graph needs a configured grasp id when goals span {} grasps",
                grasps.len()
            ))),
        }
    }

    /// translates goal-set deltas into edge-change events for the retained
    /// search: folded lifts appear and disappear, and the multi-grasp root
    /// gains layer edges for grasps introduced by new goals.
    fn goal_change_events(
        &mut self,
        removed: &[(NodeId, GraspId)],
        added: &[(NodeId, GraspId)],
    ) -> Vec<EdgeChange> {
        let mut events = Vec::new();
        match self.config.graph_type {
            GraphType::FoldedDynamic => {
                for (uid, gid) in removed {
                    let base = self.table.get(VertexKind::roadmap(*uid, GraphLayer::Base));
                    let lift = self
                        .table
                        .get(VertexKind::roadmap(*uid, GraphLayer::Grasp(*gid)));
                    if let (Some(base), Some(lift)) = (base, lift) {
                        events.push(EdgeChange {
                            u: base,
                            v: lift,
                            old_cost: Cost::ZERO,
                        });
                    }
                }
                for (uid, gid) in added {
                    if let Some(base) = self.table.get(VertexKind::roadmap(*uid, GraphLayer::Base))
                    {
                        let lift = self
                            .table
                            .id_of(VertexKind::roadmap(*uid, GraphLayer::Grasp(*gid)));
                        events.push(EdgeChange {
                            u: base,
                            v: lift,
                            old_cost: Cost::INFINITY,
                        });
                    }
                }
            }
            GraphType::MultiGrasp => {
                for (_, gid) in added {
                    if let Some(root) = self.table.get(VertexKind::Root) {
                        let layer_start = self
                            .table
                            .id_of(VertexKind::roadmap(self.start_uid, GraphLayer::Grasp(*gid)));
                        events.push(EdgeChange {
                            u: root,
                            v: layer_start,
                            old_cost: Cost::INFINITY,
                        });
                    }
                }
            }
            GraphType::SingleGrasp | GraphType::FoldedStationary => {}
        }
        events
    }

    /// densification created these roadmap edges; for every direction whose
    /// tail already carries a finite `g`, the retained search learns of the
    /// new edge as a cost drop from infinity.
    fn new_edge_events(
        &self,
        new_edges: &[(NodeId, NodeId)],
        resolved_grasp: Option<GraspId>,
    ) -> Vec<EdgeChange> {
        if new_edges.is_empty() {
            return Vec::new();
        }
        let layers: Vec<GraphLayer> = match self.config.graph_type {
            GraphType::SingleGrasp => {
                resolved_grasp.into_iter().map(GraphLayer::Grasp).collect()
            }
            GraphType::MultiGrasp => self
                .goals
                .grasp_ids()
                .into_iter()
                .map(GraphLayer::Grasp)
                .collect(),
            GraphType::FoldedStationary | GraphType::FoldedDynamic => vec![GraphLayer::Base],
        };
        let mut events = Vec::new();
        for (a, b) in new_edges {
            for layer in &layers {
                let va = self.table.get(VertexKind::roadmap(*a, *layer));
                let vb = self.table.get(VertexKind::roadmap(*b, *layer));
                if let (Some(va), Some(vb)) = (va, vb) {
                    if self.search.has_finite_g(va) {
                        events.push(EdgeChange {
                            u: va,
                            v: vb,
                            old_cost: Cost::INFINITY,
                        });
                    }
                    if self.search.has_finite_g(vb) {
                        events.push(EdgeChange {
                            u: vb,
                            v: va,
                            old_cost: Cost::INFINITY,
                        });
                    }
                }
            }
        }
        events
    }

    fn assemble_solution(
        &self,
        steps: &[(NodeId, Option<GraspId>)],
        result: &SearchResult,
    ) -> Result<Solution, PlannerError> {
        let (goal_uid, goal_gid) = *steps.last().ok_or_else(|| {
            PlannerError::InternalError("solution path has no vertices".to_string())
        })?;
        let gid = goal_gid.ok_or_else(|| {
            PlannerError::InternalError("solution ends on a grasp-agnostic vertex".to_string())
        })?;
        let goal = self.goals.goal_at(goal_uid, gid).ok_or_else(|| {
            PlannerError::InternalError(format!(
                "no goal registered at node {} for grasp {}",
                goal_uid, gid
            ))
        })?;
        let mut path: Vec<Configuration> = Vec::with_capacity(steps.len());
        let mut last: Option<NodeId> = None;
        for (uid, _) in steps {
            // virtual root and lift vertices collapse onto their node
            if last == Some(*uid) {
                continue;
            }
            last = Some(*uid);
            path.push(self.roadmap.config_of(*uid)?.clone());
        }
        log::debug!(
            "solved: goal {} at cost {} with {} waypoints",
            goal.goal_id,
            result.total_cost(),
            path.len()
        );
        Ok(Solution {
            goal_id: goal.goal_id,
            path,
            cost: result.total_cost(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::search::SearchAlgorithmType;
    use crate::testing::mock::BoxStateSpace;
    use approx::assert_relative_eq;

    fn grasped_square(gids: &[u64]) -> BoxStateSpace {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut space = BoxStateSpace::unit_square();
        for gid in gids {
            space.register_grasp_for_test(GraspId(*gid));
        }
        space
    }

    fn config(
        algo_type: SearchAlgorithmType,
        graph_type: GraphType,
        batch_size: usize,
    ) -> PlannerConfig {
        PlannerConfig {
            algo_type,
            graph_type,
            batch_size,
            max_batches: 1,
            ..Default::default()
        }
    }

    fn goal(id: u64, config: Vec<f64>, gid: u64, quality: f64) -> Goal {
        Goal::new(GoalId(id), config, GraspId(gid), quality)
    }

    #[test]
    fn test_unit_square_direct_connection_costs_the_distance() {
        let mut planner = MultiGraspPlanner::new(
            Arc::new(grasped_square(&[0])),
            vec![0.45, 0.45],
            config(SearchAlgorithmType::LpaStar, GraphType::SingleGrasp, 128),
        )
        .unwrap();
        planner.add_goal(goal(1, vec![0.55, 0.55], 0, 0.0)).unwrap();
        let solution = planner.plan().unwrap().expect("query is feasible");
        assert_eq!(solution.goal_id, GoalId(1));
        let direct = (2.0f64 * 0.1 * 0.1).sqrt();
        assert_relative_eq!(solution.cost.as_f64(), direct, epsilon = 1e-9);
        assert_eq!(solution.path.first().unwrap(), &vec![0.45, 0.45]);
        assert_eq!(solution.path.last().unwrap(), &vec![0.55, 0.55]);
    }

    #[test]
    fn test_unit_square_long_diagonal() {
        let mut planner = MultiGraspPlanner::new(
            Arc::new(grasped_square(&[0])),
            vec![0.1, 0.1],
            config(SearchAlgorithmType::LpaStar, GraphType::SingleGrasp, 256),
        )
        .unwrap();
        planner.add_goal(goal(1, vec![0.9, 0.9], 0, 0.0)).unwrap();
        let solution = planner.plan().unwrap().expect("query is feasible");
        let direct = (2.0f64 * 0.8 * 0.8).sqrt();
        // the straight line lower-bounds any roadmap path; sampling noise
        // stays within a small detour factor at this density
        assert!(solution.cost.as_f64() >= direct - 1e-9);
        assert!(solution.cost.as_f64() <= 1.35 * direct);
        // the path makes monotone progress toward the goal
        assert!(solution.path.len() >= 2);
    }

    #[test]
    fn test_blocked_interval_is_infeasible() {
        let mut space = BoxStateSpace::unit_line().with_invalid_box(vec![0.4], vec![0.6]);
        space.register_grasp_for_test(GraspId(0));
        let mut cfg = config(SearchAlgorithmType::LpaStar, GraphType::SingleGrasp, 32);
        cfg.max_batches = 2;
        let mut planner = MultiGraspPlanner::new(Arc::new(space), vec![0.0], cfg).unwrap();
        planner.add_goal(goal(1, vec![1.0], 0, 0.0)).unwrap();
        assert!(planner.plan().unwrap().is_none());
    }

    #[test]
    fn test_quality_steers_goal_selection() {
        let mut planner = MultiGraspPlanner::new(
            Arc::new(grasped_square(&[0])),
            vec![0.1, 0.1],
            config(SearchAlgorithmType::LpaStar, GraphType::SingleGrasp, 256),
        )
        .unwrap();
        planner.add_goal(goal(1, vec![0.9, 0.9], 0, 0.0)).unwrap();
        planner.add_goal(goal(2, vec![0.5, 0.5], 0, 1.0)).unwrap();
        let solution = planner.plan().unwrap().expect("query is feasible");
        // goal 2 wins on path cost + quality penalty: its penalty is zero
        // while goal 1 pays the full scaled quality gap on a longer path
        assert_eq!(solution.goal_id, GoalId(2));
    }

    #[test]
    fn test_replan_after_goal_removal_reuses_search_state() {
        let near = vec![0.35, 0.35];
        let far = vec![0.85, 0.85];
        let mut planner = MultiGraspPlanner::new(
            Arc::new(grasped_square(&[0])),
            vec![0.1, 0.1],
            config(SearchAlgorithmType::LpaStar, GraphType::SingleGrasp, 128),
        )
        .unwrap();
        planner.add_goal(goal(1, near.clone(), 0, 0.0)).unwrap();
        planner.add_goal(goal(2, far.clone(), 0, 0.0)).unwrap();
        let first = planner.plan().unwrap().expect("query is feasible");
        assert_eq!(first.goal_id, GoalId(1));
        let expansions_first = planner.expansions();

        planner.remove_goals(&[GoalId(1)]).unwrap();
        let second = planner.plan().unwrap().expect("query is feasible");
        assert_eq!(second.goal_id, GoalId(2));
        let incremental_expansions = planner.expansions() - expansions_first;

        // a fresh eager search to the surviving goal re-expands everything
        let mut scratch = MultiGraspPlanner::new(
            Arc::new(grasped_square(&[0])),
            vec![0.1, 0.1],
            config(SearchAlgorithmType::AStar, GraphType::SingleGrasp, 128),
        )
        .unwrap();
        scratch.add_goal(goal(2, far, 0, 0.0)).unwrap();
        scratch.plan().unwrap().expect("query is feasible");
        assert!(
            incremental_expansions < scratch.expansions(),
            "incremental replan expanded {} vertices, scratch {}",
            incremental_expansions,
            scratch.expansions()
        );
    }

    #[test]
    fn test_multi_grasp_avoids_the_blocked_grasp() {
        let mut space = grasped_square(&[0, 1]);
        // holding the object with grasp 0 cannot pass the slab
        space.block_for_grasp(GraspId(0), vec![0.45, 0.0], vec![0.55, 1.0]);
        let mut planner = MultiGraspPlanner::new(
            Arc::new(space),
            vec![0.1, 0.5],
            config(SearchAlgorithmType::LpaStar, GraphType::MultiGrasp, 128),
        )
        .unwrap();
        planner.add_goal(goal(1, vec![0.9, 0.5], 0, 0.0)).unwrap();
        planner.add_goal(goal(2, vec![0.9, 0.5], 1, 0.0)).unwrap();
        let solution = planner.plan().unwrap().expect("query is feasible");
        assert_eq!(solution.goal_id, GoalId(2));
    }

    #[test]
    fn test_folded_graphs_share_the_base_layer() {
        let mut stationary = MultiGraspPlanner::new(
            Arc::new(grasped_square(&[0, 1])),
            vec![0.5, 0.1],
            config(SearchAlgorithmType::AStar, GraphType::FoldedStationary, 128),
        )
        .unwrap();
        stationary.add_goal(goal(1, vec![0.2, 0.8], 0, 0.0)).unwrap();
        stationary.add_goal(goal(2, vec![0.8, 0.8], 1, 1.0)).unwrap();
        let solution = stationary.plan().unwrap().expect("query is feasible");
        // equal path lengths, so the quality penalty decides
        assert_eq!(solution.goal_id, GoalId(2));
    }

    #[test]
    fn test_folded_dynamic_absorbs_goal_removal() {
        let mut planner = MultiGraspPlanner::new(
            Arc::new(grasped_square(&[0, 1])),
            vec![0.5, 0.1],
            config(SearchAlgorithmType::LpaStar, GraphType::FoldedDynamic, 128),
        )
        .unwrap();
        planner.add_goal(goal(1, vec![0.2, 0.8], 0, 0.0)).unwrap();
        planner.add_goal(goal(2, vec![0.8, 0.8], 1, 1.0)).unwrap();
        let first = planner.plan().unwrap().expect("query is feasible");
        assert_eq!(first.goal_id, GoalId(2));
        planner.remove_goals(&[GoalId(2)]).unwrap();
        let second = planner.plan().unwrap().expect("query is feasible");
        assert_eq!(second.goal_id, GoalId(1));
    }

    #[test]
    fn test_lazy_algorithms_agree_with_eager() {
        let mut costs = Vec::new();
        for algo in [
            SearchAlgorithmType::LpaStar,
            SearchAlgorithmType::LazyWeightedLpaStar,
            SearchAlgorithmType::LazySpLpaStar,
            SearchAlgorithmType::LazyWeightedAStar,
        ] {
            let mut planner = MultiGraspPlanner::new(
                Arc::new(grasped_square(&[0])),
                vec![0.1, 0.1],
                config(algo, GraphType::SingleGrasp, 192),
            )
            .unwrap();
            planner.add_goal(goal(1, vec![0.9, 0.9], 0, 0.0)).unwrap();
            let solution = planner.plan().unwrap().expect("query is feasible");
            costs.push(solution.cost.as_f64());
        }
        for cost in &costs[1..] {
            assert_relative_eq!(*cost, costs[0], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_fixed_halton_offset_is_deterministic() {
        let run = || {
            let mut planner = MultiGraspPlanner::new(
                Arc::new(grasped_square(&[0, 1])),
                vec![0.1, 0.1],
                config(SearchAlgorithmType::LpaStar, GraphType::MultiGrasp, 128),
            )
            .unwrap();
            planner.add_goal(goal(1, vec![0.9, 0.3], 0, 0.0)).unwrap();
            planner.add_goal(goal(2, vec![0.3, 0.9], 1, 0.5)).unwrap();
            planner.plan().unwrap().expect("query is feasible")
        };
        let a = run();
        let b = run();
        assert_eq!(a.goal_id, b.goal_id);
        assert_eq!(a.cost, b.cost);
        assert_eq!(a.path, b.path);
    }

    #[test]
    fn test_invalid_start_is_unsolvable_not_an_error() {
        let space = grasped_square(&[0]).with_invalid_box(vec![0.45, 0.45], vec![0.55, 0.55]);
        let mut planner = MultiGraspPlanner::new(
            Arc::new(space),
            vec![0.5, 0.5],
            config(SearchAlgorithmType::LpaStar, GraphType::SingleGrasp, 64),
        )
        .unwrap();
        planner.add_goal(goal(1, vec![0.9, 0.9], 0, 0.0)).unwrap();
        assert!(planner.plan().unwrap().is_none());
    }

    #[test]
    fn test_planning_without_goals_is_a_programmer_error() {
        let mut planner = MultiGraspPlanner::new(
            Arc::new(grasped_square(&[0])),
            vec![0.5, 0.5],
            PlannerConfig::default(),
        )
        .unwrap();
        assert!(matches!(
            planner.plan(),
            Err(PlannerError::GoalFailure {
                source: GoalError::NoGoals
            })
        ));
    }

    #[test]
    fn test_missing_clearance_support_falls_back_to_binary_costs() {
        let mut space = BoxStateSpace::unit_square()
            .with_point_cost(crate::model::cost::PointCostModel::ReciprocalClearance)
            .without_clearance_support();
        space.register_grasp_for_test(GraspId(0));
        let mut planner = MultiGraspPlanner::new(
            Arc::new(space),
            vec![0.45, 0.45],
            config(SearchAlgorithmType::LpaStar, GraphType::SingleGrasp, 128),
        )
        .unwrap();
        planner.add_goal(goal(1, vec![0.55, 0.55], 0, 0.0)).unwrap();
        let solution = planner.plan().unwrap().expect("query is feasible");
        // binary costs reduce edge cost to path length
        let direct = (2.0f64 * 0.1 * 0.1).sqrt();
        assert_relative_eq!(solution.cost.as_f64(), direct, epsilon = 1e-9);
    }

    #[test]
    fn test_trace_sinks_record_planning_activity() {
        let dir = tempfile::tempdir().unwrap();
        let roadmap_path = dir.path().join("roadmap.csv");
        let event_path = dir.path().join("events.csv");
        {
            let mut planner = MultiGraspPlanner::new(
                Arc::new(grasped_square(&[0])),
                vec![0.45, 0.45],
                config(SearchAlgorithmType::LpaStar, GraphType::SingleGrasp, 64),
            )
            .unwrap();
            planner.set_trace(TraceSink::from_paths(&roadmap_path, &event_path).unwrap());
            planner.add_goal(goal(1, vec![0.55, 0.55], 0, 0.0)).unwrap();
            planner.plan().unwrap().expect("query is feasible");
        }
        let roadmap = std::fs::read_to_string(&roadmap_path).unwrap();
        // every node creation is one record: uid, dimension, coordinates
        assert!(roadmap.lines().count() >= 64);
        assert!(roadmap.lines().all(|l| l.split(',').count() == 4));
        let events = std::fs::read_to_string(&event_path).unwrap();
        assert!(events.lines().any(|l| l.starts_with("VAL_BASE,")));
        assert!(events.lines().any(|l| l.starts_with("VAL_GRASP,")));
        assert!(events.lines().any(|l| l.starts_with("EDGE_COST_GRASP,")));
    }
}
