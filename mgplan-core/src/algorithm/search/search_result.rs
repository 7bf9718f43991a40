use crate::model::unit::Cost;

use super::SearchVertexId;

/// outcome of a shortest-path computation. `path_cost` is the transport
/// cost to the recorded goal vertex and `goal_cost` its terminal quality
/// penalty; the search minimizes their sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    pub solved: bool,
    /// a termination model stopped the search before quiescence; the other
    /// fields carry the best goal found so far
    pub interrupted: bool,
    pub goal_vertex: Option<SearchVertexId>,
    pub path_cost: Cost,
    pub goal_cost: Cost,
}

impl Default for SearchResult {
    fn default() -> Self {
        SearchResult {
            solved: false,
            interrupted: false,
            goal_vertex: None,
            path_cost: Cost::INFINITY,
            goal_cost: Cost::INFINITY,
        }
    }
}

impl SearchResult {
    /// the minimized objective: path cost plus quality penalty.
    pub fn total_cost(&self) -> Cost {
        self.path_cost + self.goal_cost
    }
}
