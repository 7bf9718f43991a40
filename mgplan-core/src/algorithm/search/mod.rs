mod folded;
mod graph_ops;
pub mod lpa_star;
mod multi_grasp;
mod search_algorithm;
mod search_error;
mod search_graph;
mod search_result;
mod single_grasp;
mod vertex_table;

pub use folded::FoldedGraph;
pub use multi_grasp::MultiGraspGraph;
pub use search_algorithm::SearchAlgorithmType;
pub use search_error::SearchError;
pub use search_graph::{EdgeChange, SearchGraph, SearchVertexId};
pub use search_result::SearchResult;
pub use single_grasp::SingleGraspGraph;
pub use vertex_table::{GraphLayer, VertexKind, VertexTable};
