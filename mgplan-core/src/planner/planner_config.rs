use serde::{Deserialize, Serialize};

use crate::algorithm::search::SearchAlgorithmType;
use crate::model::cost::DEFAULT_STEP_SIZE;
use crate::model::space::GraspId;
use crate::model::termination::TerminationModel;

use super::PlannerError;

/// which logical graph the search runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphType {
    /// the roadmap under one chosen grasp
    SingleGrasp,
    /// the product of the roadmap with the grasp set
    MultiGrasp,
    /// grasp-agnostic base layer with goal lifts; heuristic frozen, search
    /// reset on goal-set changes
    FoldedStationary,
    /// as stationary, but goal-set changes are absorbed incrementally with
    /// refreshed heuristics; requires an LPA*-family algorithm
    FoldedDynamic,
}

/// Planner construction parameters. All fields default, so a config can be
/// deserialized from partial JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub algo_type: SearchAlgorithmType,
    pub graph_type: GraphType,
    /// path-cost vs. goal-quality trade-off weight
    pub lambda: f64,
    /// reserved; parsed and ignored
    pub extreme_lazy: bool,
    /// the grasp a single-grasp graph plans for. when absent, the goals
    /// must all share one grasp
    pub grasp: Option<GraspId>,
    /// edge-cost integration step
    pub step_size: f64,
    /// Halton points added per densification round
    pub batch_size: usize,
    /// densification rounds a single plan call may spend before giving up
    pub max_batches: usize,
    /// index offset into the Halton sequence (the densification seed)
    pub halton_offset: u64,
    pub termination: Option<TerminationModel>,
}

impl Default for PlannerConfig {
    fn default() -> PlannerConfig {
        PlannerConfig {
            algo_type: SearchAlgorithmType::LpaStar,
            graph_type: GraphType::MultiGrasp,
            lambda: 1.0,
            extreme_lazy: false,
            grasp: None,
            step_size: DEFAULT_STEP_SIZE,
            batch_size: 256,
            max_batches: 4,
            halton_offset: 0,
            termination: None,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.graph_type == GraphType::FoldedDynamic && !self.algo_type.is_incremental() {
            return Err(PlannerError::InvalidConfiguration(format!(
                "graph type {:?} requires an LPA*-family algorithm, found {:?}",
                self.graph_type, self.algo_type
            )));
        }
        if self.lambda < 0.0 {
            return Err(PlannerError::InvalidConfiguration(format!(
                "lambda must be non-negative, found {}",
                self.lambda
            )));
        }
        if self.step_size <= 0.0 {
            return Err(PlannerError::InvalidConfiguration(format!(
                "step_size must be positive, found {}",
                self.step_size
            )));
        }
        if self.batch_size == 0 {
            return Err(PlannerError::InvalidConfiguration(
                "batch_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
