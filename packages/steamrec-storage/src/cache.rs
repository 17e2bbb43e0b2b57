use std::{collections::HashMap, fmt, sync::RwLock};

use steamrec_domain::{Graph, TimeWindow};

use crate::Result;

/// Key of a cached graph: the time window plus a label for the build options
/// that change the graph's contents.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CacheKey(String);
impl CacheKey {
	pub fn for_build(window: &TimeWindow, options: &str) -> Self {
		Self(format!("graph_{}_{}_{options}", window.start_ms, window.end_ms))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl fmt::Display for CacheKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Key-value store for built graphs.
///
/// Entries are not validated against the inputs they were built from; dropping
/// stale entries is up to the caller.
pub trait GraphCache: Send + Sync {
	fn get(&self, key: &CacheKey) -> Result<Option<Graph>>;

	fn put(&self, key: &CacheKey, graph: &Graph) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryGraphCache {
	entries: RwLock<HashMap<CacheKey, Graph>>,
}
impl MemoryGraphCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.read().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
impl GraphCache for MemoryGraphCache {
	fn get(&self, key: &CacheKey) -> Result<Option<Graph>> {
		let entries = self.entries.read().unwrap_or_else(|err| err.into_inner());

		Ok(entries.get(key).cloned())
	}

	fn put(&self, key: &CacheKey, graph: &Graph) -> Result<()> {
		let mut entries = self.entries.write().unwrap_or_else(|err| err.into_inner());

		entries.insert(key.clone(), graph.clone());

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn key_is_named_after_the_window_and_options() {
		let window = TimeWindow::new(10, 20).expect("Expected a valid window.");

		let skip = CacheKey::for_build(&window, "skip_enforced");

		assert_eq!(skip.as_str(), "graph_10_20_skip_enforced");
		assert_ne!(skip, CacheKey::for_build(&window, "keep_enforced"));
	}

	#[test]
	fn memory_cache_returns_what_was_put() {
		let cache = MemoryGraphCache::new();
		let window = TimeWindow::new(10, 20).expect("Expected a valid window.");
		let key = CacheKey::for_build(&window, "skip_enforced");
		let graph = Graph::new(window, Default::default());

		assert_eq!(cache.get(&key).expect("Memory cache never fails."), None);

		cache.put(&key, &graph).expect("Memory cache never fails.");

		assert_eq!(cache.get(&key).expect("Memory cache never fails."), Some(graph));
		assert_eq!(cache.len(), 1);
	}
}
