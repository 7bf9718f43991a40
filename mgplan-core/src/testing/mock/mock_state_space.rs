use std::cell::RefCell;
use std::collections::HashMap;

use crate::model::cost::PointCostModel;
use crate::model::space::{Grasp, GraspId, SpaceInformation, StateSpace, StateSpaceError};
use crate::model::unit::Cost;

/// axis-aligned blocked region
#[derive(Debug, Clone)]
struct Aabb {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Aabb {
    fn contains(&self, config: &[f64]) -> bool {
        config
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(x, (lo, hi))| lo <= x && x <= hi)
    }

    /// euclidean distance from a point outside the box to its surface
    fn distance_to(&self, config: &[f64]) -> f64 {
        let mut sum = 0.0;
        for (x, (lo, hi)) in config.iter().zip(self.lower.iter().zip(self.upper.iter())) {
            let d = if x < lo {
                lo - x
            } else if x > hi {
                x - hi
            } else {
                0.0
            };
            sum += d * d;
        }
        sum.sqrt()
    }
}

#[derive(Debug, Default)]
struct SceneState {
    active_grasp: Option<GraspId>,
}

/// Restores the scene snapshot on every exit path, per the scoped
/// acquisition contract of the oracle.
struct SceneLock<'a> {
    scene: &'a RefCell<SceneState>,
    saved: Option<GraspId>,
}

impl Drop for SceneLock<'_> {
    fn drop(&mut self) {
        self.scene.borrow_mut().active_grasp = self.saved;
    }
}

/// A state-space oracle over an axis-aligned box world. Base validity
/// excludes the base blocked regions; applying a grasp adds that grasp's
/// regions to the scene for the duration of the query. Point costs follow
/// the configured [`PointCostModel`] over clearance to the nearest blocked
/// region or wall.
pub struct BoxStateSpace {
    info: SpaceInformation,
    grasps: HashMap<GraspId, Grasp>,
    base_blocks: Vec<Aabb>,
    grasp_blocks: HashMap<GraspId, Vec<Aabb>>,
    point_cost: PointCostModel,
    clearance_support: bool,
    scene: RefCell<SceneState>,
}

impl BoxStateSpace {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<BoxStateSpace, StateSpaceError> {
        Ok(BoxStateSpace {
            info: SpaceInformation::new(lower, upper)?,
            grasps: HashMap::new(),
            base_blocks: Vec::new(),
            grasp_blocks: HashMap::new(),
            point_cost: PointCostModel::Uniform { value: 1.0 },
            clearance_support: true,
            scene: RefCell::new(SceneState::default()),
        })
    }

    /// the 2-D unit square with unit point costs (the identity oracle)
    pub fn unit_square() -> BoxStateSpace {
        BoxStateSpace::new(vec![0.0, 0.0], vec![1.0, 1.0])
            .expect("unit square bounds are valid")
    }

    /// the 1-D unit interval with unit point costs
    pub fn unit_line() -> BoxStateSpace {
        BoxStateSpace::new(vec![0.0], vec![1.0]).expect("unit line bounds are valid")
    }

    pub fn with_invalid_box(mut self, lower: Vec<f64>, upper: Vec<f64>) -> BoxStateSpace {
        self.base_blocks.push(Aabb { lower, upper });
        self
    }

    pub fn with_point_cost(mut self, model: PointCostModel) -> BoxStateSpace {
        self.point_cost = model;
        self
    }

    pub fn without_clearance_support(mut self) -> BoxStateSpace {
        self.clearance_support = false;
        self
    }

    /// registers a placeholder grasp under the given id
    pub fn register_grasp_for_test(&mut self, gid: GraspId) {
        self.add_grasp(Grasp::new(gid, [1.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0], vec![0.0]))
            .expect("test grasp ids must be unique");
    }

    /// blocks a region only while the given grasp is applied
    pub fn block_for_grasp(&mut self, gid: GraspId, lower: Vec<f64>, upper: Vec<f64>) {
        self.grasp_blocks
            .entry(gid)
            .or_default()
            .push(Aabb { lower, upper });
    }

    fn apply_grasp(&self, gid: GraspId) -> Result<SceneLock<'_>, StateSpaceError> {
        if !self.grasps.contains_key(&gid) {
            return Err(StateSpaceError::UnknownGrasp(gid));
        }
        let saved = self.scene.borrow_mut().active_grasp.replace(gid);
        Ok(SceneLock {
            scene: &self.scene,
            saved,
        })
    }

    fn active_blocks(&self) -> Vec<&Aabb> {
        let mut blocks: Vec<&Aabb> = self.base_blocks.iter().collect();
        if let Some(gid) = self.scene.borrow().active_grasp {
            if let Some(extra) = self.grasp_blocks.get(&gid) {
                blocks.extend(extra.iter());
            }
        }
        blocks
    }

    fn scene_valid(&self, config: &[f64]) -> bool {
        self.info.contains(config) && !self.active_blocks().iter().any(|b| b.contains(config))
    }

    fn scene_cost(&self, config: &[f64]) -> Cost {
        if !self.scene_valid(config) {
            return Cost::INFINITY;
        }
        match self.point_cost {
            PointCostModel::Uniform { value } => Cost::new(value),
            _ => {
                let wall_clearance = config
                    .iter()
                    .zip(self.info.lower().iter().zip(self.info.upper().iter()))
                    .map(|(x, (lo, hi))| (x - lo).min(hi - x))
                    .fold(f64::INFINITY, f64::min);
                let block_clearance = self
                    .active_blocks()
                    .iter()
                    .map(|b| b.distance_to(config))
                    .fold(f64::INFINITY, f64::min);
                self.point_cost
                    .cost_of_clearance(wall_clearance.min(block_clearance))
            }
        }
    }
}

impl StateSpace for BoxStateSpace {
    fn space_information(&self) -> &SpaceInformation {
        &self.info
    }

    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt()
    }

    fn is_valid(&self, config: &[f64]) -> bool {
        debug_assert!(self.scene.borrow().active_grasp.is_none());
        self.scene_valid(config)
    }

    fn is_valid_with_grasp(
        &self,
        config: &[f64],
        gid: GraspId,
        _lock_grasp: bool,
    ) -> Result<bool, StateSpaceError> {
        let _scene = self.apply_grasp(gid)?;
        Ok(self.scene_valid(config))
    }

    fn cost(&self, config: &[f64]) -> Cost {
        debug_assert!(self.scene.borrow().active_grasp.is_none());
        self.scene_cost(config)
    }

    fn conditional_cost(&self, config: &[f64], gid: GraspId) -> Result<Cost, StateSpaceError> {
        let _scene = self.apply_grasp(gid)?;
        Ok(self.scene_cost(config))
    }

    fn add_grasp(&mut self, grasp: Grasp) -> Result<(), StateSpaceError> {
        if self.grasps.contains_key(&grasp.gid) {
            return Err(StateSpaceError::DuplicateGrasp(grasp.gid));
        }
        self.grasps.insert(grasp.gid, grasp);
        Ok(())
    }

    fn remove_grasp(&mut self, gid: GraspId) -> Result<(), StateSpaceError> {
        self.grasps
            .remove(&gid)
            .ok_or(StateSpaceError::UnknownGrasp(gid))?;
        self.grasp_blocks.remove(&gid);
        Ok(())
    }

    fn supports_clearance(&self) -> bool {
        self.clearance_support
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grasp_scene_is_restored_on_exit() {
        let mut space = BoxStateSpace::unit_square();
        space.register_grasp_for_test(GraspId(1));
        space.block_for_grasp(GraspId(1), vec![0.4, 0.4], vec![0.6, 0.6]);
        let config = [0.5, 0.5];
        assert!(space.is_valid(&config));
        assert!(!space.is_valid_with_grasp(&config, GraspId(1), true).unwrap());
        // the snapshot is restored: the unconditional query sees no grasp
        assert!(space.is_valid(&config));
    }

    #[test]
    fn test_unknown_grasp_rejected() {
        let space = BoxStateSpace::unit_square();
        assert!(matches!(
            space.is_valid_with_grasp(&[0.5, 0.5], GraspId(3), true),
            Err(StateSpaceError::UnknownGrasp(GraspId(3)))
        ));
    }

    #[test]
    fn test_duplicate_grasp_rejected() {
        let mut space = BoxStateSpace::unit_square();
        space.register_grasp_for_test(GraspId(0));
        let result = space.add_grasp(Grasp::new(
            GraspId(0),
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            vec![],
        ));
        assert!(matches!(result, Err(StateSpaceError::DuplicateGrasp(_))));
    }

    #[test]
    fn test_clearance_cost() {
        let space = BoxStateSpace::unit_square()
            .with_point_cost(PointCostModel::ReciprocalClearance)
            .with_invalid_box(vec![0.0, 0.0], vec![0.1, 1.0]);
        // nearest obstacle is the blocked slab at x = 0.1
        let cost = space.cost(&[0.3, 0.5]);
        assert!((cost.as_f64() - 5.0).abs() < 1e-9);
        assert_eq!(space.cost(&[0.05, 0.5]), Cost::INFINITY);
    }
}
