mod integrator;
mod point_cost;

pub use integrator::{EdgeCostIntegrator, DEFAULT_STEP_SIZE};
pub use point_cost::PointCostModel;
