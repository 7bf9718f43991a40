use crate::algorithm::search::SearchVertexId;
use crate::model::unit::Cost;

use super::Key;

/// Search bookkeeping for one vertex, materialized on first reference. The
/// heuristic is fetched from the graph exactly once, at materialization.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VertexData {
    /// currently known cost from the start
    pub g: Cost,
    /// one-step lookahead cost through the best predecessor
    pub rhs: Cost,
    pub h: Cost,
    pub parent: SearchVertexId,
    pub queued: bool,
    /// the vertex was found invalid; it never re-enters the queue
    pub invalid: bool,
}

impl VertexData {
    pub fn new(h: Cost, vertex: SearchVertexId) -> VertexData {
        VertexData {
            g: Cost::INFINITY,
            rhs: Cost::INFINITY,
            h,
            parent: vertex,
            queued: false,
            invalid: false,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.g == self.rhs
    }

    pub fn key(&self) -> Key {
        let m = self.g.min(self.rhs);
        Key::new(m + self.h, m)
    }
}
