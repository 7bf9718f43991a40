use crate::model::goal::{GoalSet, MultiGoalHeuristic};
use crate::model::roadmap::{NodeId, Roadmap};
use crate::model::space::GraspId;
use crate::model::unit::Cost;

use super::graph_ops::{check_node_validity, layer_edge_cost, successors_in_layer};
use super::{EdgeChange, GraphLayer, SearchError, SearchGraph, SearchVertexId, VertexKind, VertexTable};

/// The folded multi-grasp graph: one grasp-agnostic base layer priced with
/// base costs (admissible for every grasp, so a single search is shared
/// across all of them), lifting into a per-grasp vertex only at goal nodes
/// through zero-cost edges. Grasp-conditional validity is paid exactly
/// once, at the lift.
///
/// The stationary and dynamic variants share this adapter; they differ in
/// how the planner treats retained search state when the goal set changes
/// (reset versus heuristic refresh plus lift-edge change events).
pub struct FoldedGraph<'a> {
    roadmap: &'a mut Roadmap,
    goals: &'a GoalSet,
    heuristic: &'a MultiGoalHeuristic,
    table: &'a mut VertexTable,
    start_uid: NodeId,
    pending: Vec<EdgeChange>,
}

impl<'a> FoldedGraph<'a> {
    pub fn new(
        roadmap: &'a mut Roadmap,
        goals: &'a GoalSet,
        heuristic: &'a MultiGoalHeuristic,
        table: &'a mut VertexTable,
        start_uid: NodeId,
    ) -> FoldedGraph<'a> {
        FoldedGraph {
            roadmap,
            goals,
            heuristic,
            table,
            start_uid,
            pending: Vec::new(),
        }
    }

    fn kind_of(&self, v: SearchVertexId) -> Result<VertexKind, SearchError> {
        self.table.kind_of(v).ok_or(SearchError::UnknownVertex(v))
    }

    /// whether the lift edge at `uid` into grasp `gid` currently exists.
    fn lift_exists(&self, uid: NodeId, gid: GraspId) -> bool {
        self.goals.goal_at(uid, gid).is_some()
    }
}

impl SearchGraph for FoldedGraph<'_> {
    fn start_vertex(&mut self) -> Result<SearchVertexId, SearchError> {
        Ok(self
            .table
            .id_of(VertexKind::roadmap(self.start_uid, GraphLayer::Base)))
    }

    fn check_validity(&mut self, v: SearchVertexId) -> Result<bool, SearchError> {
        match self.kind_of(v)? {
            VertexKind::Root => Err(SearchError::UnknownVertex(v)),
            VertexKind::Roadmap { uid, layer } => check_node_validity(
                self.roadmap,
                self.table,
                uid,
                layer.grasp(),
                &[GraphLayer::Base],
                &mut self.pending,
            ),
        }
    }

    fn heuristic(&mut self, v: SearchVertexId) -> Result<Cost, SearchError> {
        match self.kind_of(v)? {
            VertexKind::Root => Err(SearchError::UnknownVertex(v)),
            VertexKind::Roadmap { uid, layer } => match layer {
                // lifted vertices are terminal; the quality penalty is paid
                // through the goal cost, not the heuristic
                GraphLayer::Grasp(_) => Ok(Cost::ZERO),
                GraphLayer::Base => match self.roadmap.node(uid) {
                    None => Ok(Cost::INFINITY),
                    Some(node) => Ok(self.heuristic.cost_to_go(&node.config)),
                },
            },
        }
    }

    fn successors(
        &mut self,
        v: SearchVertexId,
        lazy: bool,
    ) -> Result<Vec<SearchVertexId>, SearchError> {
        match self.kind_of(v)? {
            VertexKind::Root => Err(SearchError::UnknownVertex(v)),
            VertexKind::Roadmap { uid, layer } => match layer {
                GraphLayer::Grasp(_) => Ok(Vec::new()),
                GraphLayer::Base => {
                    let mut out = successors_in_layer(
                        self.roadmap,
                        self.table,
                        uid,
                        GraphLayer::Base,
                        &[GraphLayer::Base],
                        lazy,
                        &mut self.pending,
                    )?;
                    let mut lifted: Vec<GraspId> = Vec::new();
                    for goal_id in self.goals.goals_at(uid).to_vec() {
                        let gid = self.goals.goal(goal_id)?.gid;
                        if lifted.contains(&gid) {
                            continue;
                        }
                        lifted.push(gid);
                        if lazy {
                            if self.roadmap.known_invalid(uid, Some(gid)) {
                                continue;
                            }
                        } else if !check_node_validity(
                            self.roadmap,
                            self.table,
                            uid,
                            Some(gid),
                            &[GraphLayer::Base],
                            &mut self.pending,
                        )? {
                            continue;
                        }
                        out.push(
                            self.table
                                .id_of(VertexKind::roadmap(uid, GraphLayer::Grasp(gid))),
                        );
                    }
                    Ok(out)
                }
            },
        }
    }

    fn predecessors(
        &mut self,
        v: SearchVertexId,
        lazy: bool,
    ) -> Result<Vec<SearchVertexId>, SearchError> {
        match self.kind_of(v)? {
            VertexKind::Root => Err(SearchError::UnknownVertex(v)),
            VertexKind::Roadmap { uid, layer } => match layer {
                // a lifted vertex is reached only from its own base vertex
                GraphLayer::Grasp(_) => Ok(vec![self
                    .table
                    .id_of(VertexKind::roadmap(uid, GraphLayer::Base))]),
                GraphLayer::Base => successors_in_layer(
                    self.roadmap,
                    self.table,
                    uid,
                    GraphLayer::Base,
                    &[GraphLayer::Base],
                    lazy,
                    &mut self.pending,
                ),
            },
        }
    }

    fn edge_cost(
        &mut self,
        u: SearchVertexId,
        v: SearchVertexId,
        lazy: bool,
    ) -> Result<Cost, SearchError> {
        let ku = self.kind_of(u)?;
        let kv = self.kind_of(v)?;
        match (ku, kv) {
            (
                VertexKind::Roadmap { uid: ua, layer: GraphLayer::Base },
                VertexKind::Roadmap { uid: ub, layer: GraphLayer::Base },
            ) => layer_edge_cost(
                self.roadmap,
                self.table,
                ua,
                ub,
                GraphLayer::Base,
                lazy,
                &mut self.pending,
            ),
            (
                VertexKind::Roadmap { uid: ua, layer: GraphLayer::Base },
                VertexKind::Roadmap { uid: ub, layer: GraphLayer::Grasp(gid) },
            )
            | (
                VertexKind::Roadmap { uid: ub, layer: GraphLayer::Grasp(gid) },
                VertexKind::Roadmap { uid: ua, layer: GraphLayer::Base },
            ) => {
                if ua == ub && self.lift_exists(ub, gid) {
                    Ok(Cost::ZERO)
                } else {
                    Ok(Cost::INFINITY)
                }
            }
            _ => Ok(Cost::INFINITY),
        }
    }

    fn is_goal(&mut self, v: SearchVertexId) -> Result<bool, SearchError> {
        match self.kind_of(v)? {
            VertexKind::Roadmap { uid, layer: GraphLayer::Grasp(gid) } => {
                if !self.lift_exists(uid, gid) {
                    return Ok(false);
                }
                Ok(self.roadmap.is_valid_for_grasp(uid, gid)?)
            }
            _ => Ok(false),
        }
    }

    fn goal_cost(&mut self, v: SearchVertexId) -> Result<Cost, SearchError> {
        match self.kind_of(v)? {
            VertexKind::Roadmap { uid, layer: GraphLayer::Grasp(gid) } => Ok(self
                .goals
                .goal_at(uid, gid)
                .map(|g| self.heuristic.goal_cost(g.quality))
                .unwrap_or(Cost::INFINITY)),
            _ => Ok(Cost::INFINITY),
        }
    }

    fn grasp_roadmap_id(
        &self,
        v: SearchVertexId,
    ) -> Result<(NodeId, Option<GraspId>), SearchError> {
        match self.kind_of(v)? {
            VertexKind::Root => Err(SearchError::UnknownVertex(v)),
            VertexKind::Roadmap { uid, layer } => Ok((uid, layer.grasp())),
        }
    }

    fn take_edge_changes(&mut self) -> Vec<EdgeChange> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cost::EdgeCostIntegrator;
    use crate::model::goal::{Goal, GoalId};
    use crate::testing::mock::BoxStateSpace;
    use std::sync::Arc;

    #[test]
    fn test_lift_edges_exist_only_at_goal_nodes() {
        let mut space = BoxStateSpace::unit_square();
        space.register_grasp_for_test(GraspId(0));
        let space = Arc::new(space);
        let mut roadmap = Roadmap::new(space.clone(), EdgeCostIntegrator::default(), 0);
        let start = roadmap.add_node(vec![0.4, 0.4]);
        let mut goals = GoalSet::default();
        let goal_uid = goals
            .add_goal(Goal::new(GoalId(1), vec![0.6, 0.6], GraspId(0), 0.5), &mut roadmap)
            .unwrap();
        roadmap.densify(64);
        let heuristic = MultiGoalHeuristic::build(space, &goals, 1.0).unwrap();
        let mut table = VertexTable::default();

        let (base_goal, lift) = {
            let mut graph =
                FoldedGraph::new(&mut roadmap, &goals, &heuristic, &mut table, start);
            let s = graph.start_vertex().unwrap();
            assert_eq!(graph.grasp_roadmap_id(s).unwrap(), (start, None));
            // walk the base layer to the goal node and find its lift
            let base_goal = graph.successors(s, true).unwrap().into_iter()
                .find(|v| graph.grasp_roadmap_id(*v).unwrap() == (goal_uid, None))
                .expect("goal lies within the connection radius of the start");
            let succs = graph.successors(base_goal, true).unwrap();
            let lift = succs
                .into_iter()
                .find(|v| graph.grasp_roadmap_id(*v).unwrap() == (goal_uid, Some(GraspId(0))))
                .expect("goal node lifts into its grasp layer");
            assert_eq!(graph.edge_cost(base_goal, lift, true).unwrap(), Cost::ZERO);
            assert!(graph.is_goal(lift).unwrap());
            assert!(!graph.is_goal(base_goal).unwrap());
            assert_eq!(graph.heuristic(lift).unwrap(), Cost::ZERO);
            assert_eq!(graph.predecessors(lift, true).unwrap(), vec![base_goal]);
            assert!(graph.successors(lift, true).unwrap().is_empty());
            (base_goal, lift)
        };

        // removing the goal severs the lift edge
        goals.remove_goals(&[GoalId(1)]).unwrap();
        let mut graph = FoldedGraph::new(&mut roadmap, &goals, &heuristic, &mut table, start);
        assert_eq!(
            graph.edge_cost(base_goal, lift, true).unwrap(),
            Cost::INFINITY
        );
        assert!(!graph.is_goal(lift).unwrap());
    }
}
