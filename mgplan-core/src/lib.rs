//! Core library of the mgplan multi-grasp motion planner.
//!
//! A shared probabilistic roadmap carries lazily-evaluated, cached validity
//! and cost data, both grasp-agnostic and per-grasp. Graph adapters present
//! the roadmap to an incremental (LPA*) search engine as one of several
//! logical search graphs, so that work done for one grasp is amortized
//! across all of them. The planner surface lives in [`planner`].

pub mod algorithm;
pub mod model;
pub mod planner;

pub mod util;

// test doubles shared between unit tests and downstream integration tests
pub mod testing;
