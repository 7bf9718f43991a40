use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Cooperative termination for the search engine, evaluated between queue
/// pops. A triggered model interrupts the query, surfacing the best goal
/// found so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationModel {
    /// interrupts a query once its runtime exceeds the limit. only checked
    /// at the provided pop frequency, since reading the clock is not free.
    QueryRuntimeLimit { limit: Duration, frequency: u64 },
    /// interrupts once the number of vertex expansions exceeds the limit
    ExpansionsLimit { limit: u64 },
    Combined { models: Vec<TerminationModel> },
}

impl TerminationModel {
    /// predicate to test whether the search should stop at this pop.
    pub fn terminate_search(&self, start_time: &Instant, expansions: u64) -> bool {
        use TerminationModel as T;
        match self {
            T::QueryRuntimeLimit { limit, frequency } => {
                if expansions % frequency.max(&1) == 0 {
                    Instant::now().duration_since(*start_time) > *limit
                } else {
                    false
                }
            }
            T::ExpansionsLimit { limit } => expansions + 1 > *limit,
            T::Combined { models } => models
                .iter()
                .any(|m| m.terminate_search(start_time, expansions)),
        }
    }

    /// a string explaining why the model interrupted the search, or None if
    /// its conditions are not met.
    pub fn explain_termination(&self, start_time: &Instant, expansions: u64) -> Option<String> {
        use TerminationModel as T;
        if !self.terminate_search(start_time, expansions) {
            return None;
        }
        match self {
            T::Combined { models } => {
                let combined: String = models
                    .iter()
                    .filter_map(|m| m.explain_termination(start_time, expansions))
                    .collect::<Vec<_>>()
                    .join(", ");
                (!combined.is_empty()).then_some(combined)
            }
            T::QueryRuntimeLimit { limit, .. } => {
                Some(format!("exceeded runtime limit of {:?}", limit))
            }
            T::ExpansionsLimit { limit } => {
                Some(format!("exceeded expansion limit of {}", limit))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TerminationModel as T;
    use std::time::{Duration, Instant};

    #[test]
    fn test_within_expansion_limit() {
        let m = T::ExpansionsLimit { limit: 10 };
        let t = Instant::now();
        assert!(!m.terminate_search(&t, 8));
        assert!(m.terminate_search(&t, 10));
        assert!(m.explain_termination(&t, 10).is_some());
    }

    #[test]
    fn test_runtime_limit_respects_frequency() {
        let start = Instant::now() - Duration::from_secs(2);
        let m = T::QueryRuntimeLimit {
            limit: Duration::from_secs(1),
            frequency: 10,
        };
        // off-frequency pops never read the clock
        assert!(!m.terminate_search(&start, 3));
        assert!(m.terminate_search(&start, 10));
    }

    #[test]
    fn test_combined_any_triggers() {
        let start = Instant::now();
        let m = T::Combined {
            models: vec![
                T::ExpansionsLimit { limit: 100 },
                T::ExpansionsLimit { limit: 5 },
            ],
        };
        assert!(m.terminate_search(&start, 7));
    }
}
