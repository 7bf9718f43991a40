use serde::{Deserialize, Serialize};

use super::lpa_star::{EdgeEvaluationPolicy, LpaStarSearch};
use super::{SearchError, SearchGraph};

/// The search algorithm families the planner can run. All of them share one
/// LPA* engine; they differ along two axes: whether state is retained
/// between queries (the LPA* family) and how lazily edge costs are
/// consumed. The first run of an incremental algorithm is exactly its
/// non-incremental counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchAlgorithmType {
    /// evaluate edges exactly during expansion, fresh state per query
    AStar,
    /// expand on cached lower bounds, resolving parent edges on pop; fresh
    /// state per query
    LazyWeightedAStar,
    /// exact edge evaluation, state retained across queries
    LpaStar,
    /// lazy-weighted expansion, state retained across queries
    LazyWeightedLpaStar,
    /// plan entirely on cached bounds, certify candidate paths, absorb the
    /// resulting changes, repeat; state retained across queries
    LazySpLpaStar,
}

impl SearchAlgorithmType {
    pub fn policy(&self) -> EdgeEvaluationPolicy {
        match self {
            SearchAlgorithmType::AStar | SearchAlgorithmType::LpaStar => {
                EdgeEvaluationPolicy::Eager
            }
            SearchAlgorithmType::LazyWeightedAStar | SearchAlgorithmType::LazyWeightedLpaStar => {
                EdgeEvaluationPolicy::LazyWeighted
            }
            SearchAlgorithmType::LazySpLpaStar => EdgeEvaluationPolicy::FullyLazy,
        }
    }

    /// whether search state is retained between `plan` calls.
    pub fn is_incremental(&self) -> bool {
        matches!(
            self,
            SearchAlgorithmType::LpaStar
                | SearchAlgorithmType::LazyWeightedLpaStar
                | SearchAlgorithmType::LazySpLpaStar
        )
    }

    /// runs the engine to a certified result: eager searches are done at
    /// quiescence; lazy searches alternate planning with path
    /// certification (validity and exact costs along the candidate path)
    /// until a path survives unchanged.
    pub fn run<G: SearchGraph + ?Sized>(
        &self,
        search: &mut LpaStarSearch,
        graph: &mut G,
    ) -> Result<(), SearchError> {
        if !self.is_incremental() {
            search.reset();
        }
        loop {
            search.compute_shortest_path(graph)?;
            let result = search.result();
            if !result.solved || result.interrupted {
                return Ok(());
            }
            if self.policy() == EdgeEvaluationPolicy::Eager {
                return Ok(());
            }
            let path = search.extract_path()?;
            let mut dirty = false;
            for v in &path {
                if !graph.check_validity(*v)? {
                    search.invalidate_vertex(graph, *v)?;
                    dirty = true;
                }
            }
            let mut changes = graph.take_edge_changes();
            for window in path.windows(2) {
                let _ = graph.edge_cost(window[0], window[1], false)?;
                changes.extend(graph.take_edge_changes());
            }
            if changes.is_empty() && !dirty {
                return Ok(());
            }
            search.update_edges(graph, changes)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_mapping() {
        assert_eq!(
            SearchAlgorithmType::AStar.policy(),
            EdgeEvaluationPolicy::Eager
        );
        assert_eq!(
            SearchAlgorithmType::LazyWeightedLpaStar.policy(),
            EdgeEvaluationPolicy::LazyWeighted
        );
        assert!(!SearchAlgorithmType::LazyWeightedAStar.is_incremental());
        assert!(SearchAlgorithmType::LazySpLpaStar.is_incremental());
    }

    #[test]
    fn test_deserializes_from_snake_case() {
        let algo: SearchAlgorithmType = serde_json::from_str(r#""lazy_weighted_a_star""#).unwrap();
        assert_eq!(algo, SearchAlgorithmType::LazyWeightedAStar);
    }
}
