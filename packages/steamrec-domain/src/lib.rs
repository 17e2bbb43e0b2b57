pub mod graph;
pub mod model;
pub mod tags;
pub mod window;

mod error;

pub use error::{Error, Result};
pub use graph::{Contribution, Graph, GraphNode};
pub use model::{Curator, Game, RecommendationEvent};
pub use tags::TagDistribution;
pub use window::{TimeWindow, extract_bias, format_epoch_ms};
