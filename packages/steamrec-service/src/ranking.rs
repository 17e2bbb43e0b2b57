use std::{
	cmp::Ordering,
	collections::{BTreeMap, BTreeSet},
};

use serde::Serialize;

use steamrec_domain::{Graph, GraphNode, TagDistribution};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedCurator {
	pub curator_id: String,
	/// Sum of the curator's biases over the selected neighbors.
	pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Neighbor {
	pub game_id: String,
	pub distance: f64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoRecommendationReason {
	EmptyGraph,
	/// `k` or `n` was zero.
	NoNeighbors,
	/// No curator accumulated a non-zero score.
	NoSignal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Prediction {
	Ranked { curators: Vec<RankedCurator> },
	NoRecommendation { reason: NoRecommendationReason },
}
impl Prediction {
	pub fn curators(&self) -> &[RankedCurator] {
		match self {
			Self::Ranked { curators } => curators,
			Self::NoRecommendation { .. } => &[],
		}
	}

	pub fn curator_ids(&self) -> Vec<&str> {
		self.curators().iter().map(|curator| curator.curator_id.as_str()).collect()
	}

	pub fn top(&self) -> Option<&RankedCurator> {
		self.curators().first()
	}

	pub fn is_ranked(&self) -> bool {
		matches!(self, Self::Ranked { .. })
	}
}

/// Euclidean distance over the union of both tag sets, absent tags counting as zero.
///
/// Terms are summed in tag order, so the result does not depend on argument order.
pub fn distance(left: &TagDistribution, right: &TagDistribution) -> f64 {
	let tags: BTreeSet<&str> = left.tags().chain(right.tags()).collect();

	tags.into_iter()
		.map(|tag| {
			let delta = left.get(tag) - right.get(tag);

			delta * delta
		})
		.sum::<f64>()
		.sqrt()
}

/// The `k` nodes closest to `query`, nearest first, ties broken by game id.
pub fn nearest_neighbors(graph: &Graph, query: &TagDistribution, k: usize) -> Vec<Neighbor> {
	select_neighbors(graph, query, k)
		.into_iter()
		.map(|(game_id, distance, _)| Neighbor { game_id: game_id.to_string(), distance })
		.collect()
}

/// Ranks curators by their summed bias over the `k` nearest games, keeping the top `n`.
///
/// `k` above the node count selects every node. Ties in score go to the smaller
/// curator id.
pub fn predict(graph: &Graph, query: &TagDistribution, k: usize, n: usize) -> Prediction {
	if graph.is_empty() {
		return Prediction::NoRecommendation { reason: NoRecommendationReason::EmptyGraph };
	}
	if k == 0 || n == 0 {
		return Prediction::NoRecommendation { reason: NoRecommendationReason::NoNeighbors };
	}

	let mut totals: BTreeMap<&str, f64> = BTreeMap::new();

	for (_, _, node) in select_neighbors(graph, query, k) {
		for contribution in &node.contributions {
			*totals.entry(contribution.curator_id.as_str()).or_insert(0.0) += contribution.bias;
		}
	}

	if totals.values().all(|total| *total == 0.0) {
		return Prediction::NoRecommendation { reason: NoRecommendationReason::NoSignal };
	}

	let mut curators: Vec<RankedCurator> = totals
		.into_iter()
		.map(|(curator_id, score)| RankedCurator { curator_id: curator_id.to_string(), score })
		.collect();

	curators.sort_by(|left, right| {
		cmp_f64_desc(left.score, right.score).then_with(|| left.curator_id.cmp(&right.curator_id))
	});
	curators.truncate(n);

	Prediction::Ranked { curators }
}

/// Single-result form of [`predict`].
pub fn predict_one(graph: &Graph, query: &TagDistribution, k: usize) -> Option<RankedCurator> {
	match predict(graph, query, k, 1) {
		Prediction::Ranked { mut curators } => curators.pop(),
		Prediction::NoRecommendation { .. } => None,
	}
}

fn select_neighbors<'g>(
	graph: &'g Graph,
	query: &TagDistribution,
	k: usize,
) -> Vec<(&'g str, f64, &'g GraphNode)> {
	let mut scored: Vec<(&str, f64, &GraphNode)> = graph
		.iter()
		.map(|(game_id, node)| (game_id, distance(query, &node.tag_ratios), node))
		.collect();

	scored.sort_by(|left, right| left.1.total_cmp(&right.1).then_with(|| left.0.cmp(right.0)));
	scored.truncate(k);

	scored
}

fn cmp_f64_desc(left: f64, right: f64) -> Ordering {
	right.total_cmp(&left)
}
