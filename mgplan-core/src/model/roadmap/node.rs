use std::collections::HashMap;
use std::fmt::Display;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::model::space::{Configuration, GraspId};

/// identifies a roadmap node. monotonically increasing, stable for the
/// node's lifetime, never reused after deletion.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sampled configuration in the roadmap. Base validity is unknown until
/// the first validity query; a node found invalid is deleted and never
/// re-inserted. Grasp-conditional validity is memoized per grasp id.
#[derive(Debug, Clone)]
pub struct RoadmapNode {
    pub uid: NodeId,
    pub config: Configuration,
    pub(super) initialized: bool,
    pub(super) conditional_validity: HashMap<GraspId, bool>,
    pub(super) neighbors: IndexSet<NodeId>,
    pub(super) densification_gen: u64,
}

impl RoadmapNode {
    pub(super) fn new(uid: NodeId, config: Configuration) -> RoadmapNode {
        RoadmapNode {
            uid,
            config,
            initialized: false,
            conditional_validity: HashMap::new(),
            neighbors: IndexSet::new(),
            densification_gen: 0,
        }
    }

    /// whether base validity has been checked (and found true).
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// memoized grasp-conditional validity, if it has been checked.
    pub fn cached_grasp_validity(&self, gid: GraspId) -> Option<bool> {
        self.conditional_validity.get(&gid).copied()
    }

    pub fn neighbors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.neighbors.iter().copied()
    }

    pub fn densification_gen(&self) -> u64 {
        self.densification_gen
    }
}
