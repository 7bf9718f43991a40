use std::collections::HashMap;

use crate::model::space::Configuration;

use super::NodeId;

/// Dynamic nearest-neighbor index over live roadmap nodes.
///
/// Configuration spaces have runtime dimension, which rules out the
/// compile-time-dimensional spatial trees; a flat scan with id-stable
/// removal is exact and fast enough at roadmap scales, and its insertion
/// order is deterministic, which search determinism relies on.
#[derive(Debug, Default)]
pub struct NearestNeighborIndex {
    ids: Vec<NodeId>,
    points: Vec<Configuration>,
    slots: HashMap<NodeId, usize>,
}

impl NearestNeighborIndex {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn insert(&mut self, uid: NodeId, point: Configuration) {
        debug_assert!(!self.slots.contains_key(&uid));
        self.slots.insert(uid, self.ids.len());
        self.ids.push(uid);
        self.points.push(point);
    }

    pub fn remove(&mut self, uid: NodeId) {
        if let Some(slot) = self.slots.remove(&uid) {
            self.ids.swap_remove(slot);
            self.points.swap_remove(slot);
            if let Some(moved) = self.ids.get(slot) {
                self.slots.insert(*moved, slot);
            }
        }
    }

    /// all node ids within `radius` of `query` under the given metric, in
    /// index order.
    pub fn within_radius<D>(&self, query: &[f64], radius: f64, distance: D) -> Vec<NodeId>
    where
        D: Fn(&[f64], &[f64]) -> f64,
    {
        self.ids
            .iter()
            .zip(self.points.iter())
            .filter(|(_, p)| distance(query, p) <= radius)
            .map(|(uid, _)| *uid)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn euclidean(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt()
    }

    #[test]
    fn test_within_radius() {
        let mut index = NearestNeighborIndex::default();
        index.insert(NodeId(0), vec![0.0, 0.0]);
        index.insert(NodeId(1), vec![1.0, 0.0]);
        index.insert(NodeId(2), vec![0.1, 0.1]);
        let near = index.within_radius(&[0.0, 0.0], 0.5, euclidean);
        assert_eq!(near, vec![NodeId(0), NodeId(2)]);
    }

    #[test]
    fn test_remove_keeps_slots_consistent() {
        let mut index = NearestNeighborIndex::default();
        index.insert(NodeId(0), vec![0.0]);
        index.insert(NodeId(1), vec![0.5]);
        index.insert(NodeId(2), vec![1.0]);
        index.remove(NodeId(0));
        assert_eq!(index.len(), 2);
        let near = index.within_radius(&[1.0], 0.6, euclidean);
        assert!(near.contains(&NodeId(1)) && near.contains(&NodeId(2)));
        index.remove(NodeId(2));
        assert_eq!(index.within_radius(&[0.0], 10.0, euclidean), vec![NodeId(1)]);
    }
}
