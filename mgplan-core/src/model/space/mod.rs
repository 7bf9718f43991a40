mod clearance_fallback;
mod grasp;
mod space_information;
mod state_space;
mod state_space_error;

pub use clearance_fallback::BinaryCostFallback;
pub use grasp::{Grasp, GraspId};
pub use space_information::SpaceInformation;
pub use state_space::StateSpace;
pub use state_space_error::StateSpaceError;

/// a point in the robot's joint space: one value per joint, fixed dimension.
pub type Configuration = Vec<f64>;
