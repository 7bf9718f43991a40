use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::model::cost::EdgeCostIntegrator;
use crate::model::space::{Configuration, GraspId, StateSpace};
use crate::model::unit::Cost;
use crate::util::halton::HaltonSampler;

use super::{EdgeKey, NodeId, RoadmapEdge, RoadmapError, RoadmapNode, TraceSink};

/// outcome of resolving an edge cost. `previous` carries the cached value
/// the resolution invalidated, if it changed; adapters turn it into
/// edge-change events for the search engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostResolution {
    pub cost: Cost,
    pub previous: Option<Cost>,
}

impl CostResolution {
    fn cached(cost: Cost) -> CostResolution {
        CostResolution {
            cost,
            previous: None,
        }
    }

    fn resolved(cost: Cost, old: Cost) -> CostResolution {
        CostResolution {
            cost,
            previous: (old != cost).then_some(old),
        }
    }
}

/// The shared probabilistic roadmap. Owns every node through its id-indexed
/// map and every edge through a separate store keyed by unordered endpoint
/// pairs; adjacency refreshes use the PRM* connection radius over the
/// dynamic nearest-neighbor index. Validity and edge costs are evaluated
/// lazily on first touch and cached.
pub struct Roadmap {
    space: Arc<dyn StateSpace>,
    integrator: EdgeCostIntegrator,
    nodes: IndexMap<NodeId, RoadmapNode>,
    edges: HashMap<EdgeKey, RoadmapEdge>,
    // evaluated-infinite pairs between live endpoints; never re-created
    dead_pairs: HashSet<EdgeKey>,
    nn_index: super::NearestNeighborIndex,
    sampler: HaltonSampler,
    next_uid: u64,
    densification_gen: u64,
    new_edges: Vec<(NodeId, NodeId)>,
    gamma_prm: f64,
    trace: Option<TraceSink>,
    validity_checks: u64,
    edge_evaluations: u64,
}

impl Roadmap {
    pub fn new(
        space: Arc<dyn StateSpace>,
        integrator: EdgeCostIntegrator,
        halton_offset: u64,
    ) -> Roadmap {
        let info = space.space_information();
        let dimension = info.dimension();
        let gamma_prm = gamma_prm(dimension, info.volume());
        let sampler = HaltonSampler::new(dimension, halton_offset);
        Roadmap {
            space,
            integrator,
            nodes: IndexMap::new(),
            edges: HashMap::new(),
            dead_pairs: HashSet::new(),
            nn_index: super::NearestNeighborIndex::default(),
            sampler,
            next_uid: 0,
            densification_gen: 0,
            new_edges: Vec::new(),
            gamma_prm,
            trace: None,
            validity_checks: 0,
            edge_evaluations: 0,
        }
    }

    pub fn set_trace(&mut self, sink: TraceSink) {
        self.trace = Some(sink);
    }

    pub fn space(&self) -> &Arc<dyn StateSpace> {
        &self.space
    }

    pub fn integrator(&self) -> &EdgeCostIntegrator {
        &self.integrator
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn densification_gen(&self) -> u64 {
        self.densification_gen
    }

    pub fn validity_checks(&self) -> u64 {
        self.validity_checks
    }

    pub fn edge_evaluations(&self) -> u64 {
        self.edge_evaluations
    }

    /// the PRM* connection radius for the current vertex count,
    /// γ · (log n / n)^(1/D).
    pub fn connection_radius(&self) -> f64 {
        let d = self.space.space_information().dimension() as f64;
        let n = self.nodes.len().max(2) as f64;
        self.gamma_prm * (n.ln() / n).powf(1.0 / d)
    }

    /// draws `batch` Halton points, scales them into the joint limits, and
    /// inserts one node per point. a non-empty batch advances the
    /// densification generation, which marks every node's adjacency stale.
    pub fn densify(&mut self, batch: usize) {
        if batch == 0 {
            return;
        }
        for _ in 0..batch {
            let unit = self.sampler.next_point();
            let config = self.space.space_information().scale_unit_point(&unit);
            self.add_node(config);
        }
        self.densification_gen += 1;
        log::debug!(
            "densified roadmap to {} nodes (generation {})",
            self.nodes.len(),
            self.densification_gen
        );
    }

    /// unconditional insertion; validity is left unknown until queried.
    pub fn add_node(&mut self, config: Configuration) -> NodeId {
        let uid = NodeId(self.next_uid);
        self.next_uid += 1;
        if let Some(trace) = self.trace.as_mut() {
            trace.node_created(uid, &config);
        }
        self.nn_index.insert(uid, config.clone());
        self.nodes.insert(uid, RoadmapNode::new(uid, config));
        uid
    }

    pub fn node(&self, uid: NodeId) -> Option<&RoadmapNode> {
        self.nodes.get(&uid)
    }

    pub fn contains(&self, uid: NodeId) -> bool {
        self.nodes.contains_key(&uid)
    }

    pub fn config_of(&self, uid: NodeId) -> Result<&Configuration, RoadmapError> {
        self.nodes
            .get(&uid)
            .map(|n| &n.config)
            .ok_or(RoadmapError::UnknownNode(uid))
    }

    /// collected neighbor ids; empty for unknown nodes.
    pub fn neighbors_of(&self, uid: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&uid)
            .map(|n| n.neighbors().collect())
            .unwrap_or_default()
    }

    pub fn edge(&self, a: NodeId, b: NodeId) -> Option<&RoadmapEdge> {
        self.edges.get(&EdgeKey::new(a, b))
    }

    /// the cached (lazy) cost of the edge between `a` and `b`; infinite if
    /// no such edge exists or it is dead.
    pub fn lazy_cost(&self, a: NodeId, b: NodeId, gid: Option<GraspId>) -> Cost {
        self.edges
            .get(&EdgeKey::new(a, b))
            .map(|e| e.lazy_cost(gid))
            .unwrap_or(Cost::INFINITY)
    }

    /// edges created since the last drain, for incremental-search
    /// notification.
    pub fn take_new_edges(&mut self) -> Vec<(NodeId, NodeId)> {
        std::mem::take(&mut self.new_edges)
    }

    /// refreshes `uid`'s adjacency if it is stale: connects to all
    /// new neighbors within the PRM* radius (edges seeded with the distance
    /// lower bound), then prunes incident edges that are dead or lead to
    /// deleted neighbors. returns whether any work was done.
    pub fn update_adjacency(&mut self, uid: NodeId) -> bool {
        let (stale, config) = match self.nodes.get(&uid) {
            None => return false,
            Some(n) => (n.densification_gen < self.densification_gen, n.config.clone()),
        };
        if !stale {
            return false;
        }
        let radius = self.connection_radius();
        let space = Arc::clone(&self.space);
        let candidates = self
            .nn_index
            .within_radius(&config, radius, |a, b| space.distance(a, b));
        for cand in candidates {
            if cand == uid {
                continue;
            }
            let key = EdgeKey::new(uid, cand);
            if self.edges.contains_key(&key) || self.dead_pairs.contains(&key) {
                continue;
            }
            let lower = {
                let other = match self.nodes.get(&cand) {
                    None => continue,
                    Some(n) => n,
                };
                self.integrator
                    .lower_bound(self.space.as_ref(), &config, &other.config)
            };
            self.edges.insert(key, RoadmapEdge::new(lower));
            if let Some(node) = self.nodes.get_mut(&uid) {
                node.neighbors.insert(cand);
            }
            if let Some(other) = self.nodes.get_mut(&cand) {
                other.neighbors.insert(uid);
            }
            self.new_edges.push((uid, cand));
        }
        self.prune_incident_edges(uid);
        if let Some(node) = self.nodes.get_mut(&uid) {
            node.densification_gen = self.densification_gen;
        }
        true
    }

    /// memoized base validity. a node found invalid is deleted: every
    /// incident edge is killed and neighbors learn of the deletion at their
    /// next adjacency refresh.
    pub fn is_valid(&mut self, uid: NodeId) -> bool {
        let node = match self.nodes.get(&uid) {
            None => return false,
            Some(n) => n,
        };
        if node.initialized {
            return true;
        }
        let valid = self.space.is_valid(&node.config);
        self.validity_checks += 1;
        if let Some(trace) = self.trace.as_mut() {
            trace.base_validity(uid, valid);
        }
        if valid {
            if let Some(node) = self.nodes.get_mut(&uid) {
                node.initialized = true;
            }
        } else {
            self.delete_node(uid);
        }
        valid
    }

    /// memoized grasp-conditional validity; requires base validity.
    pub fn is_valid_for_grasp(&mut self, uid: NodeId, gid: GraspId) -> Result<bool, RoadmapError> {
        if !self.is_valid(uid) {
            return Ok(false);
        }
        if let Some(cached) = self.nodes[&uid].conditional_validity.get(&gid) {
            return Ok(*cached);
        }
        let valid = self
            .space
            .is_valid_with_grasp(&self.nodes[&uid].config, gid, true)?;
        self.validity_checks += 1;
        if let Some(trace) = self.trace.as_mut() {
            trace.grasp_validity(uid, gid, valid);
        }
        if let Some(node) = self.nodes.get_mut(&uid) {
            node.conditional_validity.insert(gid, valid);
        }
        Ok(valid)
    }

    /// whether a node is already known invalid (deleted, or cached false
    /// for the given grasp) without consulting the oracle.
    pub fn known_invalid(&self, uid: NodeId, gid: Option<GraspId>) -> bool {
        match self.nodes.get(&uid) {
            None => true,
            Some(node) => match gid {
                None => false,
                Some(gid) => node.cached_grasp_validity(gid) == Some(false),
            },
        }
    }

    /// resolves the base cost of an existing edge. memoized: once
    /// evaluated, the stored value is final until an endpoint dies. the
    /// resolved value is clamped to the distance lower bound so seeded
    /// optimism stays admissible for every point-cost mapping.
    pub fn compute_base_cost(&mut self, a: NodeId, b: NodeId) -> Result<CostResolution, RoadmapError> {
        let key = EdgeKey::new(a, b);
        let edge = self
            .edges
            .get(&key)
            .ok_or(RoadmapError::UnknownEdge(a, b))?;
        if edge.base_evaluated {
            return Ok(CostResolution::cached(edge.base_cost));
        }
        let old = edge.base_cost;
        let (ca, cb) = match (self.nodes.get(&a), self.nodes.get(&b)) {
            (Some(na), Some(nb)) => (na.config.clone(), nb.config.clone()),
            _ => {
                // an endpoint died since the edge was created
                if let Some(edge) = self.edges.get_mut(&key) {
                    edge.kill();
                }
                return Ok(CostResolution::resolved(Cost::INFINITY, old));
            }
        };
        let integral = self.integrator.cost(self.space.as_ref(), &ca, &cb, None)?;
        let lower = self.integrator.lower_bound(self.space.as_ref(), &ca, &cb);
        let cost = if integral.is_finite() {
            integral.max(lower)
        } else {
            Cost::INFINITY
        };
        self.edge_evaluations += 1;
        if let Some(trace) = self.trace.as_mut() {
            trace.base_cost(a, b, cost);
        }
        let edge = self
            .edges
            .get_mut(&key)
            .ok_or(RoadmapError::UnknownEdge(a, b))?;
        edge.base_cost = cost;
        edge.base_evaluated = true;
        if cost.is_infinite() {
            edge.conditional_costs.clear();
        }
        Ok(CostResolution::resolved(cost, old))
    }

    /// resolves the grasp-conditional cost of an existing edge. memoized
    /// per grasp; a dead edge short-circuits to infinity without touching
    /// the oracle. `previous` reports the cached lazy value the resolution
    /// replaced.
    pub fn compute_grasp_cost(
        &mut self,
        a: NodeId,
        b: NodeId,
        gid: GraspId,
    ) -> Result<CostResolution, RoadmapError> {
        let key = EdgeKey::new(a, b);
        let edge = self
            .edges
            .get(&key)
            .ok_or(RoadmapError::UnknownEdge(a, b))?;
        if edge.is_dead() {
            return Ok(CostResolution::cached(Cost::INFINITY));
        }
        if let Some(cached) = edge.cached_grasp_cost(gid) {
            return Ok(CostResolution::cached(cached));
        }
        let old = edge.lazy_cost(Some(gid));
        let (ca, cb) = match (self.nodes.get(&a), self.nodes.get(&b)) {
            (Some(na), Some(nb)) => (na.config.clone(), nb.config.clone()),
            _ => {
                if let Some(edge) = self.edges.get_mut(&key) {
                    edge.kill();
                }
                return Ok(CostResolution::resolved(Cost::INFINITY, old));
            }
        };
        let integral = self
            .integrator
            .cost(self.space.as_ref(), &ca, &cb, Some(gid))?;
        let lower = self.integrator.lower_bound(self.space.as_ref(), &ca, &cb);
        let cost = if integral.is_finite() {
            integral.max(lower)
        } else {
            Cost::INFINITY
        };
        self.edge_evaluations += 1;
        if let Some(trace) = self.trace.as_mut() {
            trace.grasp_cost(a, b, gid, cost);
        }
        if let Some(edge) = self.edges.get_mut(&key) {
            edge.conditional_costs.insert(gid, cost);
        }
        Ok(CostResolution::resolved(cost, old))
    }

    /// removes `uid` entirely and kills its incident edges. neighbors keep
    /// their adjacency entries until their next refresh prunes them.
    fn delete_node(&mut self, uid: NodeId) {
        let node = match self.nodes.swap_remove(&uid) {
            None => return,
            Some(n) => n,
        };
        self.nn_index.remove(uid);
        for neighbor in node.neighbors() {
            if let Some(edge) = self.edges.get_mut(&EdgeKey::new(uid, neighbor)) {
                edge.kill();
            }
        }
        log::debug!("deleted invalid roadmap node {}", uid);
    }

    fn prune_incident_edges(&mut self, uid: NodeId) {
        let neighbors = self.neighbors_of(uid);
        for neighbor in neighbors {
            let key = EdgeKey::new(uid, neighbor);
            let neighbor_alive = self.nodes.contains_key(&neighbor);
            let dead_edge = self.edges.get(&key).map(|e| e.is_dead()).unwrap_or(true);
            if !neighbor_alive || dead_edge {
                self.edges.remove(&key);
                if neighbor_alive {
                    // both endpoints live: remember the pair so a later
                    // refresh cannot re-seed an edge already proven colliding
                    self.dead_pairs.insert(key);
                }
                if let Some(node) = self.nodes.get_mut(&uid) {
                    node.neighbors.shift_remove(&neighbor);
                }
                if let Some(other) = self.nodes.get_mut(&neighbor) {
                    other.neighbors.shift_remove(&uid);
                }
            }
        }
    }
}

/// γ_PRM = 2 ((1 + 1/D) μ(X) / ξ_D)^(1/D), the asymptotically optimal
/// connection constant from PRM* theory.
fn gamma_prm(dimension: usize, volume: f64) -> f64 {
    let d = dimension as f64;
    2.0 * ((1.0 + 1.0 / d) * volume / unit_ball_measure(dimension)).powf(1.0 / d)
}

/// Lebesgue measure of the D-dimensional unit ball via the two-step
/// recurrence ξ_D = ξ_{D-2} · 2π/D.
fn unit_ball_measure(dimension: usize) -> f64 {
    let mut measure = if dimension % 2 == 0 { 1.0 } else { 2.0 };
    let mut d = if dimension % 2 == 0 { 2 } else { 3 };
    while d <= dimension {
        measure *= 2.0 * std::f64::consts::PI / d as f64;
        d += 2;
    }
    measure
}
