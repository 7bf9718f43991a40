use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::model::roadmap::NodeId;
use crate::model::space::GraspId;
use crate::model::unit::Cost;

use super::SearchError;

/// identifies a vertex of a logical search graph. stable for the lifetime
/// of the planner's vertex table, across searches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SearchVertexId(pub usize);

impl Display for SearchVertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// a lazily-cached edge value was invalidated by an exact evaluation: the
/// edge from `u` to `v` no longer costs `old_cost`. the search engine
/// absorbs these before its next queue pop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeChange {
    pub u: SearchVertexId,
    pub v: SearchVertexId,
    pub old_cost: Cost,
}

/// A logical graph over the roadmap, as seen by the search engine. The four
/// adapters (single-grasp, multi-grasp product, folded stationary/dynamic)
/// all speak this interface.
///
/// With `lazy = true`, queries return cached knowledge only: edge costs are
/// the cached optimistic values and vertex filtering skips only nodes
/// already known invalid. With `lazy = false`, queries resolve validity and
/// exact costs through the oracle; any cached value invalidated along the
/// way is reported through [`SearchGraph::take_edge_changes`].
pub trait SearchGraph {
    fn start_vertex(&mut self) -> Result<SearchVertexId, SearchError>;

    fn check_validity(&mut self, v: SearchVertexId) -> Result<bool, SearchError>;

    /// cost-to-go estimate, fetched once per vertex by the engine.
    fn heuristic(&mut self, v: SearchVertexId) -> Result<Cost, SearchError>;

    fn successors(
        &mut self,
        v: SearchVertexId,
        lazy: bool,
    ) -> Result<Vec<SearchVertexId>, SearchError>;

    fn predecessors(
        &mut self,
        v: SearchVertexId,
        lazy: bool,
    ) -> Result<Vec<SearchVertexId>, SearchError>;

    fn edge_cost(
        &mut self,
        u: SearchVertexId,
        v: SearchVertexId,
        lazy: bool,
    ) -> Result<Cost, SearchError>;

    fn is_goal(&mut self, v: SearchVertexId) -> Result<bool, SearchError>;

    /// the terminal quality penalty paid on arrival at `v`; infinite for
    /// non-goal vertices.
    fn goal_cost(&mut self, v: SearchVertexId) -> Result<Cost, SearchError>;

    /// the roadmap node and grasp behind a search vertex. `None` marks a
    /// grasp-agnostic vertex (base layer or virtual root).
    fn grasp_roadmap_id(
        &self,
        v: SearchVertexId,
    ) -> Result<(NodeId, Option<GraspId>), SearchError>;

    /// drains the edge-change events emitted by lazy resolutions since the
    /// last drain.
    fn take_edge_changes(&mut self) -> Vec<EdgeChange>;
}
