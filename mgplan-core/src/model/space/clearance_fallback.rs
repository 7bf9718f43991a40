use std::sync::Arc;

use crate::model::unit::Cost;

use super::{Grasp, GraspId, SpaceInformation, StateSpace, StateSpaceError};

/// Substitutes binary validity costs for an oracle that cannot answer
/// clearance queries: a valid configuration costs 1, an invalid one is
/// infinite. Grasp management stays with the wrapped oracle.
pub struct BinaryCostFallback {
    inner: Arc<dyn StateSpace>,
}

impl BinaryCostFallback {
    pub fn new(inner: Arc<dyn StateSpace>) -> BinaryCostFallback {
        BinaryCostFallback { inner }
    }
}

impl StateSpace for BinaryCostFallback {
    fn space_information(&self) -> &SpaceInformation {
        self.inner.space_information()
    }

    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        self.inner.distance(a, b)
    }

    fn is_valid(&self, config: &[f64]) -> bool {
        self.inner.is_valid(config)
    }

    fn is_valid_with_grasp(
        &self,
        config: &[f64],
        gid: GraspId,
        lock_grasp: bool,
    ) -> Result<bool, StateSpaceError> {
        self.inner.is_valid_with_grasp(config, gid, lock_grasp)
    }

    fn cost(&self, config: &[f64]) -> Cost {
        if self.inner.is_valid(config) {
            Cost::new(1.0)
        } else {
            Cost::INFINITY
        }
    }

    fn conditional_cost(&self, config: &[f64], gid: GraspId) -> Result<Cost, StateSpaceError> {
        if self.inner.is_valid_with_grasp(config, gid, true)? {
            Ok(Cost::new(1.0))
        } else {
            Ok(Cost::INFINITY)
        }
    }

    fn add_grasp(&mut self, grasp: Grasp) -> Result<(), StateSpaceError> {
        Err(StateSpaceError::UnsupportedOperation(format!(
            "grasp {} must be registered with the wrapped state space before planning",
            grasp.gid
        )))
    }

    fn remove_grasp(&mut self, gid: GraspId) -> Result<(), StateSpaceError> {
        Err(StateSpaceError::UnsupportedOperation(format!(
            "grasp {} must be removed through the wrapped state space",
            gid
        )))
    }
}
