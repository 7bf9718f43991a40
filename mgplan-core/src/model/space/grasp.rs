use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// identifies a grasp; assigned by the caller, unique per state space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraspId(pub u64);

impl Display for GraspId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fixed way of holding the transported object: the object pose relative
/// to the end-effector frame plus the gripper joint posture. Immutable once
/// registered with the state space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grasp {
    pub gid: GraspId,
    /// object orientation relative to the end-effector, unit quaternion (w, x, y, z)
    pub orientation: [f64; 4],
    /// object translation relative to the end-effector frame
    pub translation: [f64; 3],
    /// gripper joint values holding the object
    pub gripper_joints: Vec<f64>,
}

impl Grasp {
    pub fn new(
        gid: GraspId,
        orientation: [f64; 4],
        translation: [f64; 3],
        gripper_joints: Vec<f64>,
    ) -> Grasp {
        Grasp {
            gid,
            orientation,
            translation,
            gripper_joints,
        }
    }
}
