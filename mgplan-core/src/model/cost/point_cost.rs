use serde::{Deserialize, Serialize};

use crate::model::unit::Cost;

/// Maps a clearance value (minimum body-to-environment distance) to a point
/// cost. The reference mapping is the reciprocal of clearance, which
/// diverges as clearance approaches zero; the thresholded variant zeroes
/// the cost once clearance is comfortable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PointCostModel {
    /// a constant cost for every valid configuration, so edge costs reduce
    /// to (scaled) path length
    Uniform { value: f64 },
    /// 1/clearance
    #[default]
    ReciprocalClearance,
    /// 1/clearance below the threshold, zero at or above it
    ThresholdedClearance { threshold: f64 },
}

impl PointCostModel {
    /// the cost of a valid configuration with the given clearance.
    /// non-positive clearance is treated as touching, which is infinite.
    pub fn cost_of_clearance(&self, clearance: f64) -> Cost {
        if clearance <= 0.0 {
            return Cost::INFINITY;
        }
        match self {
            PointCostModel::Uniform { value } => Cost::new(*value),
            PointCostModel::ReciprocalClearance => Cost::new(1.0 / clearance),
            PointCostModel::ThresholdedClearance { threshold } => {
                if clearance >= *threshold {
                    Cost::ZERO
                } else {
                    Cost::new(1.0 / clearance)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reciprocal_clearance() {
        let model = PointCostModel::ReciprocalClearance;
        assert_eq!(model.cost_of_clearance(0.5), Cost::new(2.0));
        assert_eq!(model.cost_of_clearance(0.0), Cost::INFINITY);
    }

    #[test]
    fn test_threshold_zeroes_far_points() {
        let model = PointCostModel::ThresholdedClearance { threshold: 0.2 };
        assert_eq!(model.cost_of_clearance(0.25), Cost::ZERO);
        assert_eq!(model.cost_of_clearance(0.1), Cost::new(10.0));
    }

    #[test]
    fn test_deserializes_from_snake_case() {
        let model: PointCostModel =
            serde_json::from_str(r#"{"thresholded_clearance": {"threshold": 0.5}}"#).unwrap();
        assert_eq!(model, PointCostModel::ThresholdedClearance { threshold: 0.5 });
    }
}
