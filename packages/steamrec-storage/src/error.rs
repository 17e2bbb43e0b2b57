use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read dataset at {path:?}.")]
	ReadDataset { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse dataset at {path:?}: {source}")]
	ParseDataset { path: PathBuf, source: serde_json::Error },
	#[error("Cache I/O failed at {path:?}.")]
	CacheIo { path: PathBuf, source: std::io::Error },
	#[error("Invalid graph snapshot at {path:?}: {source}")]
	CacheDecode { path: PathBuf, source: serde_json::Error },
	#[error("Failed to encode graph snapshot: {0}")]
	CacheEncode(#[source] serde_json::Error),
}
