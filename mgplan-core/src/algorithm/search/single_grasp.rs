use crate::model::goal::{GoalSet, MultiGoalHeuristic};
use crate::model::roadmap::{NodeId, Roadmap};
use crate::model::space::GraspId;
use crate::model::unit::Cost;

use super::graph_ops::{check_node_validity, layer_edge_cost, roadmap_uid, successors_in_layer};
use super::{EdgeChange, GraphLayer, SearchError, SearchGraph, SearchVertexId, VertexKind, VertexTable};

/// The roadmap under one chosen grasp: vertices are roadmap nodes, validity
/// and costs are grasp-conditional, goals are the grasp's goals.
pub struct SingleGraspGraph<'a> {
    roadmap: &'a mut Roadmap,
    goals: &'a GoalSet,
    heuristic: &'a MultiGoalHeuristic,
    table: &'a mut VertexTable,
    grasp: GraspId,
    start_uid: NodeId,
    pending: Vec<EdgeChange>,
}

impl<'a> SingleGraspGraph<'a> {
    pub fn new(
        roadmap: &'a mut Roadmap,
        goals: &'a GoalSet,
        heuristic: &'a MultiGoalHeuristic,
        table: &'a mut VertexTable,
        grasp: GraspId,
        start_uid: NodeId,
    ) -> SingleGraspGraph<'a> {
        SingleGraspGraph {
            roadmap,
            goals,
            heuristic,
            table,
            grasp,
            start_uid,
            pending: Vec::new(),
        }
    }

    fn layer(&self) -> GraphLayer {
        GraphLayer::Grasp(self.grasp)
    }
}

impl SearchGraph for SingleGraspGraph<'_> {
    fn start_vertex(&mut self) -> Result<SearchVertexId, SearchError> {
        Ok(self
            .table
            .id_of(VertexKind::roadmap(self.start_uid, GraphLayer::Grasp(self.grasp))))
    }

    fn check_validity(&mut self, v: SearchVertexId) -> Result<bool, SearchError> {
        let (uid, _) = roadmap_uid(self.table, v)?;
        check_node_validity(
            self.roadmap,
            self.table,
            uid,
            Some(self.grasp),
            &[GraphLayer::Grasp(self.grasp)],
            &mut self.pending,
        )
    }

    fn heuristic(&mut self, v: SearchVertexId) -> Result<Cost, SearchError> {
        let (uid, _) = roadmap_uid(self.table, v)?;
        match self.roadmap.node(uid) {
            None => Ok(Cost::INFINITY),
            Some(node) => Ok(self.heuristic.cost_to_go_for_grasp(&node.config, self.grasp)),
        }
    }

    fn successors(
        &mut self,
        v: SearchVertexId,
        lazy: bool,
    ) -> Result<Vec<SearchVertexId>, SearchError> {
        let (uid, _) = roadmap_uid(self.table, v)?;
        let layer = self.layer();
        successors_in_layer(
            self.roadmap,
            self.table,
            uid,
            layer,
            &[layer],
            lazy,
            &mut self.pending,
        )
    }

    fn predecessors(
        &mut self,
        v: SearchVertexId,
        lazy: bool,
    ) -> Result<Vec<SearchVertexId>, SearchError> {
        // roadmap edges are undirected
        self.successors(v, lazy)
    }

    fn edge_cost(
        &mut self,
        u: SearchVertexId,
        v: SearchVertexId,
        lazy: bool,
    ) -> Result<Cost, SearchError> {
        let (ua, _) = roadmap_uid(self.table, u)?;
        let (ub, _) = roadmap_uid(self.table, v)?;
        let layer = self.layer();
        layer_edge_cost(self.roadmap, self.table, ua, ub, layer, lazy, &mut self.pending)
    }

    fn is_goal(&mut self, v: SearchVertexId) -> Result<bool, SearchError> {
        let (uid, _) = roadmap_uid(self.table, v)?;
        if self.goals.goal_at(uid, self.grasp).is_none() {
            return Ok(false);
        }
        Ok(self.roadmap.is_valid_for_grasp(uid, self.grasp)?)
    }

    fn goal_cost(&mut self, v: SearchVertexId) -> Result<Cost, SearchError> {
        let (uid, _) = roadmap_uid(self.table, v)?;
        Ok(self
            .goals
            .goal_at(uid, self.grasp)
            .map(|g| self.heuristic.goal_cost(g.quality))
            .unwrap_or(Cost::INFINITY))
    }

    fn grasp_roadmap_id(
        &self,
        v: SearchVertexId,
    ) -> Result<(NodeId, Option<GraspId>), SearchError> {
        let (uid, _) = roadmap_uid(self.table, v)?;
        Ok((uid, Some(self.grasp)))
    }

    fn take_edge_changes(&mut self) -> Vec<EdgeChange> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cost::{EdgeCostIntegrator, PointCostModel};
    use crate::testing::mock::BoxStateSpace;
    use std::sync::Arc;

    fn fixture() -> (Roadmap, GoalSet, MultiGoalHeuristic, VertexTable, NodeId, NodeId) {
        let gid = GraspId(0);
        let mut space = BoxStateSpace::unit_square()
            // doubled point costs make exact edge costs exceed the seeded bound
            .with_point_cost(PointCostModel::Uniform { value: 2.0 });
        space.register_grasp_for_test(gid);
        let space = Arc::new(space);
        let mut roadmap = Roadmap::new(space.clone(), EdgeCostIntegrator::default(), 0);
        let start = roadmap.add_node(vec![0.4, 0.4]);
        let mut goals = GoalSet::default();
        let goal_uid = goals
            .add_goal(
                crate::model::goal::Goal::new(
                    crate::model::goal::GoalId(1),
                    vec![0.6, 0.6],
                    gid,
                    0.0,
                ),
                &mut roadmap,
            )
            .unwrap();
        roadmap.densify(64);
        let heuristic = MultiGoalHeuristic::build(space, &goals, 1.0).unwrap();
        (roadmap, goals, heuristic, VertexTable::default(), start, goal_uid)
    }

    #[test]
    fn test_successors_and_goal_detection() {
        let (mut roadmap, goals, heuristic, mut table, start, goal_uid) = fixture();
        let mut graph =
            SingleGraspGraph::new(&mut roadmap, &goals, &heuristic, &mut table, GraspId(0), start);
        let s = graph.start_vertex().unwrap();
        assert!(graph.check_validity(s).unwrap());
        let succs = graph.successors(s, true).unwrap();
        assert!(!succs.is_empty());
        let goal_vertex = succs
            .iter()
            .find(|v| graph.grasp_roadmap_id(**v).unwrap().0 == goal_uid)
            .copied()
            .expect("goal lies within the connection radius of the start");
        assert!(graph.is_goal(goal_vertex).unwrap());
        assert_eq!(
            graph.grasp_roadmap_id(goal_vertex).unwrap(),
            (goal_uid, Some(GraspId(0)))
        );
    }

    #[test]
    fn test_exact_evaluation_emits_change_events_both_ways() {
        let (mut roadmap, goals, heuristic, mut table, start, _) = fixture();
        let mut graph =
            SingleGraspGraph::new(&mut roadmap, &goals, &heuristic, &mut table, GraspId(0), start);
        let s = graph.start_vertex().unwrap();
        let succs = graph.successors(s, true).unwrap();
        let n = succs[0];
        let lazy = graph.edge_cost(s, n, true).unwrap();
        let exact = graph.edge_cost(s, n, false).unwrap();
        // point cost 2 doubles the integral over the seeded distance bound
        assert!(exact > lazy);
        let changes = graph.take_edge_changes();
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().any(|c| c.u == s && c.v == n));
        assert!(changes.iter().any(|c| c.u == n && c.v == s));
        assert!(changes.iter().all(|c| c.old_cost == lazy));
        // resolution is final: a second exact query emits nothing
        assert_eq!(graph.edge_cost(s, n, false).unwrap(), exact);
        assert!(graph.take_edge_changes().is_empty());
        assert_eq!(graph.edge_cost(s, n, true).unwrap(), exact);
    }
}
