use crate::model::goal::{GoalSet, MultiGoalHeuristic};
use crate::model::roadmap::{NodeId, Roadmap};
use crate::model::space::GraspId;
use crate::model::unit::Cost;

use super::graph_ops::{check_node_validity, layer_edge_cost, successors_in_layer};
use super::{EdgeChange, GraphLayer, SearchError, SearchGraph, SearchVertexId, VertexKind, VertexTable};

/// The product of the roadmap with the grasp set: vertices are (node,
/// grasp) pairs, edges exist only within a grasp layer, and a virtual root
/// joins the start node of every layer through zero-cost edges, so the
/// search chooses the grasp and the path together.
pub struct MultiGraspGraph<'a> {
    roadmap: &'a mut Roadmap,
    goals: &'a GoalSet,
    heuristic: &'a MultiGoalHeuristic,
    table: &'a mut VertexTable,
    start_uid: NodeId,
    grasps: Vec<GraspId>,
    pending: Vec<EdgeChange>,
}

impl<'a> MultiGraspGraph<'a> {
    pub fn new(
        roadmap: &'a mut Roadmap,
        goals: &'a GoalSet,
        heuristic: &'a MultiGoalHeuristic,
        table: &'a mut VertexTable,
        start_uid: NodeId,
    ) -> MultiGraspGraph<'a> {
        let grasps = goals.grasp_ids();
        MultiGraspGraph {
            roadmap,
            goals,
            heuristic,
            table,
            start_uid,
            grasps,
            pending: Vec::new(),
        }
    }

    fn event_layers(&self) -> Vec<GraphLayer> {
        self.grasps.iter().map(|g| GraphLayer::Grasp(*g)).collect()
    }

    fn kind_of(&self, v: SearchVertexId) -> Result<VertexKind, SearchError> {
        self.table.kind_of(v).ok_or(SearchError::UnknownVertex(v))
    }
}

impl SearchGraph for MultiGraspGraph<'_> {
    fn start_vertex(&mut self) -> Result<SearchVertexId, SearchError> {
        Ok(self.table.id_of(VertexKind::Root))
    }

    fn check_validity(&mut self, v: SearchVertexId) -> Result<bool, SearchError> {
        let layers = self.event_layers();
        match self.kind_of(v)? {
            // the root stands for the shared start configuration
            VertexKind::Root => check_node_validity(
                self.roadmap,
                self.table,
                self.start_uid,
                None,
                &layers,
                &mut self.pending,
            ),
            VertexKind::Roadmap { uid, layer } => check_node_validity(
                self.roadmap,
                self.table,
                uid,
                layer.grasp(),
                &layers,
                &mut self.pending,
            ),
        }
    }

    fn heuristic(&mut self, v: SearchVertexId) -> Result<Cost, SearchError> {
        match self.kind_of(v)? {
            VertexKind::Root => match self.roadmap.node(self.start_uid) {
                None => Ok(Cost::INFINITY),
                Some(node) => Ok(self.heuristic.cost_to_go(&node.config)),
            },
            VertexKind::Roadmap { uid, layer } => match (self.roadmap.node(uid), layer.grasp()) {
                (Some(node), Some(gid)) => {
                    Ok(self.heuristic.cost_to_go_for_grasp(&node.config, gid))
                }
                (Some(node), None) => Ok(self.heuristic.cost_to_go(&node.config)),
                (None, _) => Ok(Cost::INFINITY),
            },
        }
    }

    fn successors(
        &mut self,
        v: SearchVertexId,
        lazy: bool,
    ) -> Result<Vec<SearchVertexId>, SearchError> {
        match self.kind_of(v)? {
            VertexKind::Root => {
                let mut out = Vec::with_capacity(self.grasps.len());
                let grasps = self.grasps.clone();
                let layers = self.event_layers();
                for gid in grasps {
                    if lazy {
                        if self.roadmap.known_invalid(self.start_uid, Some(gid)) {
                            continue;
                        }
                    } else if !check_node_validity(
                        self.roadmap,
                        self.table,
                        self.start_uid,
                        Some(gid),
                        &layers,
                        &mut self.pending,
                    )? {
                        continue;
                    }
                    out.push(
                        self.table
                            .id_of(VertexKind::roadmap(self.start_uid, GraphLayer::Grasp(gid))),
                    );
                }
                Ok(out)
            }
            VertexKind::Roadmap { uid, layer } => {
                let event_layers = self.event_layers();
                successors_in_layer(
                    self.roadmap,
                    self.table,
                    uid,
                    layer,
                    &event_layers,
                    lazy,
                    &mut self.pending,
                )
            }
        }
    }

    fn predecessors(
        &mut self,
        v: SearchVertexId,
        lazy: bool,
    ) -> Result<Vec<SearchVertexId>, SearchError> {
        match self.kind_of(v)? {
            VertexKind::Root => Ok(Vec::new()),
            VertexKind::Roadmap { uid, layer } => {
                let event_layers = self.event_layers();
                let mut preds = successors_in_layer(
                    self.roadmap,
                    self.table,
                    uid,
                    layer,
                    &event_layers,
                    lazy,
                    &mut self.pending,
                )?;
                if uid == self.start_uid {
                    preds.push(self.table.id_of(VertexKind::Root));
                }
                Ok(preds)
            }
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
            // grasp commitment at the start is free
            (VertexKind::Root, VertexKind::Roadmap { uid, .. })
            | (VertexKind::Roadmap { uid, .. }, VertexKind::Root) => {
                if uid == self.start_uid {
                    Ok(Cost::ZERO)
                } else {
                    Ok(Cost::INFINITY)
                }
            }
            (
                VertexKind::Roadmap { uid: ua, layer: la },
                VertexKind::Roadmap { uid: ub, layer: lb },
            ) => {
                if la != lb {
                    // no edges across grasp layers
                    return Ok(Cost::INFINITY);
                }
                layer_edge_cost(self.roadmap, self.table, ua, ub, la, lazy, &mut self.pending)
            }
            (VertexKind::Root, VertexKind::Root) => Ok(Cost::INFINITY),
        }
    }

    fn is_goal(&mut self, v: SearchVertexId) -> Result<bool, SearchError> {
        match self.kind_of(v)? {
            VertexKind::Root => Ok(false),
            VertexKind::Roadmap { uid, layer } => match layer.grasp() {
                None => Ok(false),
                Some(gid) => {
                    if self.goals.goal_at(uid, gid).is_none() {
                        return Ok(false);
                    }
                    Ok(self.roadmap.is_valid_for_grasp(uid, gid)?)
                }
            },
        }
    }

    fn goal_cost(&mut self, v: SearchVertexId) -> Result<Cost, SearchError> {
        match self.kind_of(v)? {
            VertexKind::Root => Ok(Cost::INFINITY),
            VertexKind::Roadmap { uid, layer } => Ok(layer
                .grasp()
                .and_then(|gid| self.goals.goal_at(uid, gid))
                .map(|g| self.heuristic.goal_cost(g.quality))
                .unwrap_or(Cost::INFINITY)),
        }
    }

    fn grasp_roadmap_id(
        &self,
        v: SearchVertexId,
    ) -> Result<(NodeId, Option<GraspId>), SearchError> {
        match self.kind_of(v)? {
            VertexKind::Root => Ok((self.start_uid, None)),
            VertexKind::Roadmap { uid, layer } => Ok((uid, layer.grasp())),
        }
    }

    fn take_edge_changes(&mut self) -> Vec<EdgeChange> {
        std::mem::take(&mut self.pending)
    }
}
