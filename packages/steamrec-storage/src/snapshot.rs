use std::{
	fs,
	io::ErrorKind,
	path::PathBuf,
	sync::Mutex,
};

use steamrec_domain::Graph;

use crate::{CacheKey, Error, GraphCache, Result};

/// Flat-file graph snapshots, one pretty-printed JSON document per window.
#[derive(Debug)]
pub struct FileGraphCache {
	dir: PathBuf,
	write_lock: Mutex<()>,
}
impl FileGraphCache {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into(), write_lock: Mutex::new(()) }
	}

	pub fn path_for(&self, key: &CacheKey) -> PathBuf {
		self.dir.join(format!("{key}.json"))
	}
}
impl GraphCache for FileGraphCache {
	fn get(&self, key: &CacheKey) -> Result<Option<Graph>> {
		let path = self.path_for(key);
		let raw = match fs::read(&path) {
			Ok(raw) => raw,
			Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
			Err(err) => return Err(Error::CacheIo { path, source: err }),
		};
		let graph = serde_json::from_slice(&raw)
			.map_err(|err| Error::CacheDecode { path: path.clone(), source: err })?;

		tracing::debug!(path = %path.display(), "Loaded graph snapshot.");

		Ok(Some(graph))
	}

	fn put(&self, key: &CacheKey, graph: &Graph) -> Result<()> {
		let raw = serde_json::to_vec_pretty(graph).map_err(Error::CacheEncode)?;
		let path = self.path_for(key);
		let tmp_path = path.with_extension("json.tmp");
		let _guard = self.write_lock.lock().unwrap_or_else(|err| err.into_inner());

		fs::create_dir_all(&self.dir)
			.map_err(|err| Error::CacheIo { path: self.dir.clone(), source: err })?;
		fs::write(&tmp_path, raw)
			.map_err(|err| Error::CacheIo { path: tmp_path.clone(), source: err })?;
		fs::rename(&tmp_path, &path).map_err(|err| Error::CacheIo { path: path.clone(), source: err })?;

		tracing::debug!(path = %path.display(), nodes = graph.len(), "Wrote graph snapshot.");

		Ok(())
	}
}
