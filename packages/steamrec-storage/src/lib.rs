pub mod cache;
pub mod dataset;
pub mod snapshot;

mod error;

pub use cache::{CacheKey, GraphCache, MemoryGraphCache};
pub use dataset::{Dataset, LoadReport};
pub use error::Error;
pub use snapshot::FileGraphCache;

pub type Result<T, E = Error> = std::result::Result<T, E>;
