use crate::model::unit::Cost;

use super::{Grasp, GraspId, SpaceInformation, StateSpaceError};

/// The collision/scene oracle the planner consumes. Implementations own the
/// scene representation; every query must follow the scoped acquisition
/// contract: snapshot the robot and object state, apply the grasp if the
/// query is conditional, run the query, and restore the snapshot on every
/// exit path.
///
/// All queries execute on the planner's single logical thread of control.
pub trait StateSpace {
    /// dimension and joint limits of the configuration space.
    fn space_information(&self) -> &SpaceInformation;

    /// distance between two configurations. must be a lower bound on the
    /// true cost of any motion between them; the planner requires the
    /// Euclidean metric in configuration space.
    fn distance(&self, a: &[f64], b: &[f64]) -> f64;

    /// base validity: is the robot collision-free at `config`, ignoring the
    /// transported object?
    fn is_valid(&self, config: &[f64]) -> bool;

    /// grasp-conditional validity: is the robot collision-free at `config`
    /// with the object held in grasp `gid`? `lock_grasp` pins the object to
    /// the end-effector for the duration of the query.
    fn is_valid_with_grasp(
        &self,
        config: &[f64],
        gid: GraspId,
        lock_grasp: bool,
    ) -> Result<bool, StateSpaceError>;

    /// clearance-derived point cost of `config`; +infinity in collision.
    fn cost(&self, config: &[f64]) -> Cost;

    /// point cost of `config` with the object held in grasp `gid`.
    fn conditional_cost(&self, config: &[f64], gid: GraspId) -> Result<Cost, StateSpaceError>;

    /// registers a grasp. duplicate ids are a programmer error.
    fn add_grasp(&mut self, grasp: Grasp) -> Result<(), StateSpaceError>;

    /// unregisters a grasp. unknown ids are a programmer error.
    fn remove_grasp(&mut self, gid: GraspId) -> Result<(), StateSpaceError>;

    /// whether this oracle can answer clearance (distance-to-obstacle)
    /// queries. when false, the planner substitutes binary validity costs.
    fn supports_clearance(&self) -> bool {
        true
    }
}
