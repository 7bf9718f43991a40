mod key;
mod lpa_star_search;
mod vertex_data;

pub use key::{Key, ReverseKey};
pub use lpa_star_search::{EdgeEvaluationPolicy, LpaStarSearch};
pub(crate) use vertex_data::VertexData;
