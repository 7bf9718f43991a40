use std::collections::HashMap;

use crate::model::space::GraspId;
use crate::model::unit::Cost;

use super::NodeId;

/// unordered endpoint pair keying an undirected roadmap edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    a: NodeId,
    b: NodeId,
}

impl EdgeKey {
    pub fn new(x: NodeId, y: NodeId) -> EdgeKey {
        if x <= y {
            EdgeKey { a: x, b: y }
        } else {
            EdgeKey { a: y, b: x }
        }
    }

    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.a, self.b)
    }
}

/// lifecycle of an edge's base cost.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EdgePhase {
    /// unevaluated; the cached cost is the admissible lower bound
    Optimistic,
    /// evaluated to a finite value, final until an endpoint dies
    Resolved,
    /// evaluated infinite; garbage-collected at the next adjacency refresh
    Dead,
}

/// An undirected roadmap edge shared by exactly its two endpoints. The base
/// cost is seeded with the distance lower bound and becomes final once
/// evaluated; per-grasp costs are memoized separately and short-circuit to
/// infinity when the base cost is known infinite.
#[derive(Debug, Clone)]
pub struct RoadmapEdge {
    pub(super) base_cost: Cost,
    pub(super) base_evaluated: bool,
    pub(super) conditional_costs: HashMap<GraspId, Cost>,
}

impl RoadmapEdge {
    pub(super) fn new(lower_bound: Cost) -> RoadmapEdge {
        RoadmapEdge {
            base_cost: lower_bound,
            base_evaluated: false,
            conditional_costs: HashMap::new(),
        }
    }

    pub fn base_cost(&self) -> Cost {
        self.base_cost
    }

    pub fn base_evaluated(&self) -> bool {
        self.base_evaluated
    }

    pub fn phase(&self) -> EdgePhase {
        if !self.base_evaluated {
            EdgePhase::Optimistic
        } else if self.base_cost.is_infinite() {
            EdgePhase::Dead
        } else {
            EdgePhase::Resolved
        }
    }

    pub fn is_dead(&self) -> bool {
        self.phase() == EdgePhase::Dead
    }

    /// the current cached cost without evaluating anything: the memoized
    /// grasp cost if present, otherwise the base cost (which is the lower
    /// bound while the edge is optimistic).
    pub fn lazy_cost(&self, gid: Option<GraspId>) -> Cost {
        if self.is_dead() {
            return Cost::INFINITY;
        }
        match gid {
            None => self.base_cost,
            Some(gid) => match self.conditional_costs.get(&gid) {
                Some(cost) => *cost,
                None => self.base_cost,
            },
        }
    }

    pub fn cached_grasp_cost(&self, gid: GraspId) -> Option<Cost> {
        self.conditional_costs.get(&gid).copied()
    }

    /// marks the edge dead after an endpoint was deleted.
    pub(super) fn kill(&mut self) {
        self.base_cost = Cost::INFINITY;
        self.base_evaluated = true;
        self.conditional_costs.clear();
    }
}
