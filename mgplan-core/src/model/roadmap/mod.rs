mod edge;
mod nn_index;
mod node;
mod roadmap;
mod roadmap_error;
mod trace;

pub use edge::{EdgeKey, EdgePhase, RoadmapEdge};
pub use nn_index::NearestNeighborIndex;
pub use node::{NodeId, RoadmapNode};
pub use roadmap::{CostResolution, Roadmap};
pub use roadmap_error::RoadmapError;
pub use trace::TraceSink;
