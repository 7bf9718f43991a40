use std::collections::HashMap;

use crate::model::roadmap::NodeId;
use crate::model::space::GraspId;

use super::SearchVertexId;

/// the layer a search vertex lives in: the grasp-agnostic base layer or a
/// per-grasp layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GraphLayer {
    Base,
    Grasp(GraspId),
}

impl GraphLayer {
    pub fn grasp(&self) -> Option<GraspId> {
        match self {
            GraphLayer::Base => None,
            GraphLayer::Grasp(gid) => Some(*gid),
        }
    }
}

/// what a search vertex denotes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VertexKind {
    /// the virtual root of the multi-grasp product graph
    Root,
    /// a roadmap node viewed through a layer
    Roadmap { uid: NodeId, layer: GraphLayer },
}

impl VertexKind {
    pub fn roadmap(uid: NodeId, layer: GraphLayer) -> VertexKind {
        VertexKind::Roadmap { uid, layer }
    }
}

/// Interns (roadmap node, layer) pairs as dense search-vertex ids. Owned by
/// the planner and shared across searches, so ids stay stable while the
/// engine's per-vertex data lives on.
#[derive(Default)]
pub struct VertexTable {
    kinds: Vec<VertexKind>,
    ids: HashMap<VertexKind, SearchVertexId>,
}

impl VertexTable {
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// the id for this kind, interning it on first reference.
    pub fn id_of(&mut self, kind: VertexKind) -> SearchVertexId {
        if let Some(id) = self.ids.get(&kind) {
            return *id;
        }
        let id = SearchVertexId(self.kinds.len());
        self.kinds.push(kind);
        self.ids.insert(kind, id);
        id
    }

    /// the id for this kind if it has been interned.
    pub fn get(&self, kind: VertexKind) -> Option<SearchVertexId> {
        self.ids.get(&kind).copied()
    }

    pub fn kind_of(&self, v: SearchVertexId) -> Option<VertexKind> {
        self.kinds.get(v.0).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_is_stable() {
        let mut table = VertexTable::default();
        let a = table.id_of(VertexKind::Root);
        let b = table.id_of(VertexKind::roadmap(NodeId(4), GraphLayer::Base));
        let c = table.id_of(VertexKind::roadmap(NodeId(4), GraphLayer::Grasp(GraspId(1))));
        assert_eq!(table.id_of(VertexKind::Root), a);
        assert_ne!(b, c);
        assert_eq!(
            table.kind_of(b),
            Some(VertexKind::roadmap(NodeId(4), GraphLayer::Base))
        );
        assert_eq!(table.get(VertexKind::roadmap(NodeId(9), GraphLayer::Base)), None);
        assert_eq!(table.len(), 3);
    }
}
