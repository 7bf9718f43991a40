use serde::{Deserialize, Serialize};

use super::{Configuration, StateSpaceError};

/// Immutable description of the configuration space: dimension and
/// axis-aligned joint limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceInformation {
    dimension: usize,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl SpaceInformation {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<SpaceInformation, StateSpaceError> {
        if lower.is_empty() || lower.len() != upper.len() {
            return Err(StateSpaceError::InvalidBounds(format!(
                "bounds must be non-empty and of equal length, found {} and {}",
                lower.len(),
                upper.len()
            )));
        }
        for (i, (lo, hi)) in lower.iter().zip(upper.iter()).enumerate() {
            if !(lo < hi) {
                return Err(StateSpaceError::InvalidBounds(format!(
                    "lower bound must be strictly below upper bound, found [{}, {}] at joint {}",
                    lo, hi, i
                )));
            }
        }
        Ok(SpaceInformation {
            dimension: lower.len(),
            lower,
            upper,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// volume of the bounding box, the μ(X) term of the PRM* radius.
    pub fn volume(&self) -> f64 {
        self.lower
            .iter()
            .zip(self.upper.iter())
            .map(|(lo, hi)| hi - lo)
            .product()
    }

    pub fn contains(&self, config: &[f64]) -> bool {
        config.len() == self.dimension
            && config
                .iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(x, (lo, hi))| lo <= x && x <= hi)
    }

    /// affinely scales a unit-box point into the joint limits.
    pub fn scale_unit_point(&self, unit: &[f64]) -> Configuration {
        unit.iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .map(|(t, (lo, hi))| lo + t * (hi - lo))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_inverted_bounds() {
        let result = SpaceInformation::new(vec![0.0, 1.0], vec![1.0, 0.5]);
        assert!(matches!(result, Err(StateSpaceError::InvalidBounds(_))));
    }

    #[test]
    fn test_scale_unit_point() {
        let info = SpaceInformation::new(vec![-1.0, 0.0], vec![1.0, 4.0]).unwrap();
        assert_eq!(info.scale_unit_point(&[0.5, 0.25]), vec![0.0, 1.0]);
        assert_eq!(info.volume(), 8.0);
    }
}
