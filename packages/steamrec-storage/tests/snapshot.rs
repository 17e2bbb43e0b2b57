use std::{collections::BTreeMap, fs};

use steamrec_domain::{Contribution, Graph, GraphNode, TagDistribution, TimeWindow};
use steamrec_storage::{CacheKey, Error, FileGraphCache, GraphCache};

fn sample_graph(window: TimeWindow) -> Graph {
	let tags: BTreeMap<String, u64> =
		[("RPG".to_string(), 3), ("Indie".to_string(), 1)].into_iter().collect();
	let node = GraphNode {
		tag_ratios: TagDistribution::from_counts(&tags).expect("Expected a distribution."),
		contributions: vec![
			Contribution { curator_id: "A".to_string(), bias: 0.467_599_834_941_709_76 },
			Contribution { curator_id: "B".to_string(), bias: -0.25 },
		],
	};

	Graph::new(window, [("g1".to_string(), node)].into_iter().collect())
}

#[test]
fn snapshot_round_trips_through_disk() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let cache = FileGraphCache::new(dir.path().join("cache"));
	let window = TimeWindow::new(1_411_344_000_000, 1_494_012_977_000).expect("Valid window.");
	let key = CacheKey::for_build(&window, "skip_enforced");
	let graph = sample_graph(window);

	assert!(cache.get(&key).expect("Missing snapshot is not an error.").is_none());

	cache.put(&key, &graph).expect("Failed to write snapshot.");

	let path = cache.path_for(&key);

	assert_eq!(
		path.file_name().and_then(|name| name.to_str()),
		Some("graph_1411344000000_1494012977000_skip_enforced.json")
	);
	assert_eq!(cache.get(&key).expect("Failed to read snapshot."), Some(graph));
	assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn snapshots_are_keyed_per_window() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let cache = FileGraphCache::new(dir.path());
	let first = TimeWindow::new(0, 100).expect("Valid window.");
	let second = TimeWindow::new(0, 200).expect("Valid window.");

	cache.put(&CacheKey::for_build(&first, "skip_enforced"), &sample_graph(first)).expect("Failed to write.");

	assert!(cache.get(&CacheKey::for_build(&second, "skip_enforced")).expect("Failed to read.").is_none());
}

#[test]
fn corrupt_snapshot_is_reported() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let cache = FileGraphCache::new(dir.path());
	let window = TimeWindow::new(0, 100).expect("Valid window.");
	let key = CacheKey::for_build(&window, "skip_enforced");

	fs::write(cache.path_for(&key), "{ not json").expect("Failed to write corrupt snapshot.");

	let err = cache.get(&key).expect_err("Expected a decode error.");

	assert!(matches!(err, Error::CacheDecode { .. }), "Unexpected error: {err:?}");
}
