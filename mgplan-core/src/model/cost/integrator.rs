use crate::model::space::{GraspId, StateSpace, StateSpaceError};
use crate::model::unit::Cost;

/// default integration step in configuration-space distance units
pub const DEFAULT_STEP_SIZE: f64 = 0.001;

/// Turns oracle point-cost queries along a straight configuration-space
/// segment into an edge cost, and exposes the admissible pure-distance
/// lower bound that lazy edges are seeded with.
#[derive(Debug, Clone, Copy)]
pub struct EdgeCostIntegrator {
    step_size: f64,
}

impl Default for EdgeCostIntegrator {
    fn default() -> Self {
        EdgeCostIntegrator {
            step_size: DEFAULT_STEP_SIZE,
        }
    }
}

impl EdgeCostIntegrator {
    pub fn new(step_size: f64) -> EdgeCostIntegrator {
        EdgeCostIntegrator { step_size }
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// admissible lower bound on the cost of any motion from `a` to `b`.
    pub fn lower_bound(&self, space: &dyn StateSpace, a: &[f64], b: &[f64]) -> Cost {
        Cost::new(space.distance(a, b))
    }

    /// left-Riemann sum of point costs along the straight line from `a` to
    /// `b`: N = ceil(len/h) steps, the k-th sampled at arc length k*h and
    /// weighted by min(h, len - k*h) so the final partial step is short.
    /// short-circuits to infinity at the first colliding sample. a grasp
    /// makes every point query conditional on it.
    pub fn cost(
        &self,
        space: &dyn StateSpace,
        a: &[f64],
        b: &[f64],
        gid: Option<GraspId>,
    ) -> Result<Cost, StateSpaceError> {
        let length = space.distance(a, b);
        if length == 0.0 {
            return Ok(Cost::ZERO);
        }
        let steps = (length / self.step_size).ceil() as u64;
        let mut total = 0.0;
        let mut sample = vec![0.0; a.len()];
        for k in 0..steps {
            let arc = k as f64 * self.step_size;
            let t = arc / length;
            for (s, (x, y)) in sample.iter_mut().zip(a.iter().zip(b.iter())) {
                *s = x + t * (y - x);
            }
            let point_cost = match gid {
                None => space.cost(&sample),
                Some(gid) => space.conditional_cost(&sample, gid)?,
            };
            if point_cost.is_infinite() {
                return Ok(Cost::INFINITY);
            }
            let weight = self.step_size.min(length - arc);
            total += point_cost.as_f64() * weight;
        }
        Ok(Cost::new(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cost::PointCostModel;
    use crate::model::space::GraspId;
    use crate::testing::mock::BoxStateSpace;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_length_segment_costs_nothing() {
        let space = BoxStateSpace::unit_square();
        let integrator = EdgeCostIntegrator::default();
        let a = vec![0.3, 0.3];
        let cost = integrator.cost(&space, &a, &a, None).unwrap();
        assert_eq!(cost, Cost::ZERO);
    }

    #[test]
    fn test_uniform_cost_integrates_to_length() {
        let space = BoxStateSpace::unit_square();
        let integrator = EdgeCostIntegrator::default();
        let a = vec![0.1, 0.1];
        let b = vec![0.4, 0.5];
        let cost = integrator.cost(&space, &a, &b, None).unwrap();
        // step weights telescope to exactly the segment length
        assert_relative_eq!(cost.as_f64(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_short_circuits_on_collision() {
        let space =
            BoxStateSpace::unit_square().with_invalid_box(vec![0.4, 0.0], vec![0.6, 1.0]);
        let integrator = EdgeCostIntegrator::default();
        let cost = integrator
            .cost(&space, &[0.1, 0.5], &[0.9, 0.5], None)
            .unwrap();
        assert_eq!(cost, Cost::INFINITY);
    }

    #[test]
    fn test_grasp_conditional_blocks_only_that_grasp() {
        let gid = GraspId(7);
        let mut space = BoxStateSpace::unit_square()
            .with_point_cost(PointCostModel::Uniform { value: 1.0 });
        space.register_grasp_for_test(gid);
        space.block_for_grasp(gid, vec![0.4, 0.0], vec![0.6, 1.0]);
        let integrator = EdgeCostIntegrator::default();
        let a = vec![0.1, 0.5];
        let b = vec![0.9, 0.5];
        let base = integrator.cost(&space, &a, &b, None).unwrap();
        assert_relative_eq!(base.as_f64(), 0.8, epsilon = 1e-9);
        let conditional = integrator.cost(&space, &a, &b, Some(gid)).unwrap();
        assert_eq!(conditional, Cost::INFINITY);
    }

    #[test]
    fn test_unknown_grasp_is_an_error() {
        let space = BoxStateSpace::unit_square();
        let integrator = EdgeCostIntegrator::default();
        let result = integrator.cost(&space, &[0.1, 0.1], &[0.2, 0.2], Some(GraspId(99)));
        assert!(matches!(result, Err(StateSpaceError::UnknownGrasp(_))));
    }
}
