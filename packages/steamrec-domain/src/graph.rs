use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{TagDistribution, TimeWindow};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Contribution {
	pub curator_id: String,
	pub bias: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GraphNode {
	pub tag_ratios: TagDistribution,
	pub contributions: Vec<Contribution>,
}

/// Game nodes keyed by game id, built for one time window.
///
/// Iteration is in game id order. A graph is not modified once built.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Graph {
	window: TimeWindow,
	nodes: BTreeMap<String, GraphNode>,
}
impl Graph {
	pub fn new(window: TimeWindow, nodes: BTreeMap<String, GraphNode>) -> Self {
		Self { window, nodes }
	}

	pub fn window(&self) -> &TimeWindow {
		&self.window
	}

	pub fn get(&self, game_id: &str) -> Option<&GraphNode> {
		self.nodes.get(game_id)
	}

	pub fn contains(&self, game_id: &str) -> bool {
		self.nodes.contains_key(game_id)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &GraphNode)> {
		self.nodes.iter().map(|(game_id, node)| (game_id.as_str(), node))
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}
