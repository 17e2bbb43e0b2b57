use std::{
	collections::{BTreeMap, BTreeSet},
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
};

use serde::Serialize;

use steamrec_domain::{
	Contribution, Curator, Game, Graph, GraphNode, TagDistribution, TimeWindow, extract_bias,
};
use steamrec_storage::{CacheKey, GraphCache};

use crate::{Error, Result};

/// What to do with a game nobody recommended inside the window.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroContributionPolicy {
	/// Omit the game. It has no predictive signal.
	#[default]
	Skip,
	/// Keep the game as a node with an empty contribution list.
	Keep,
}
impl ZeroContributionPolicy {
	pub fn from_label(label: &str) -> Option<Self> {
		match label {
			"skip" => Some(Self::Skip),
			"keep" => Some(Self::Keep),
			_ => None,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Skip => "skip",
			Self::Keep => "keep",
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
	/// Requested by the caller.
	Excluded,
	/// No curator contributed a bias for the game.
	NoContributions,
	/// Missing, empty or all-zero tag histogram.
	NoTags,
}

#[derive(Clone, Copy, Debug)]
pub struct BuildOptions {
	pub window: TimeWindow,
	pub enforce_window: bool,
	pub zero_contribution_policy: ZeroContributionPolicy,
}
impl BuildOptions {
	pub fn new(window: TimeWindow) -> Self {
		Self { window, enforce_window: true, zero_contribution_policy: ZeroContributionPolicy::Skip }
	}

	/// Snapshot key for a build with these options, e.g. `graph_<start>_<end>_skip_enforced`.
	pub fn cache_key(&self) -> CacheKey {
		let enforcement = if self.enforce_window { "enforced" } else { "clamped" };

		CacheKey::for_build(
			&self.window,
			&format!("{}_{enforcement}", self.zero_contribution_policy.label()),
		)
	}
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct BuildReport {
	pub games_total: usize,
	pub nodes: usize,
	pub from_cache: bool,
	pub skipped: BTreeMap<String, SkipReason>,
}
impl BuildReport {
	pub fn count(&self, reason: SkipReason) -> usize {
		self.skipped.values().filter(|skipped| **skipped == reason).count()
	}
}

#[derive(Debug)]
pub struct BuildOutcome {
	pub graph: Graph,
	pub report: BuildReport,
}

/// Shared flag checked between games while a graph is being built.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);
impl CancelFlag {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::Relaxed);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::Relaxed)
	}
}

pub struct GraphBuilder<'a> {
	options: BuildOptions,
	cache: Option<&'a dyn GraphCache>,
	cancel: Option<CancelFlag>,
}
impl<'a> GraphBuilder<'a> {
	pub fn new(options: BuildOptions) -> Self {
		Self { options, cache: None, cancel: None }
	}

	pub fn with_cache(mut self, cache: &'a dyn GraphCache) -> Self {
		self.cache = Some(cache);

		self
	}

	pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
		self.cancel = Some(cancel);

		self
	}

	/// Builds the graph of `games` against every curator's log.
	///
	/// Per game, checks run in this order: caller exclusion, contribution
	/// extraction, the zero-contribution policy, then the tag histogram.
	///
	/// The cache key covers the window and options but not exclusions, so the
	/// cache is only consulted for builds without exclusions.
	pub fn build(
		&self,
		curators: &[Curator],
		games: &[Game],
		excluded: &BTreeSet<String>,
	) -> Result<BuildOutcome> {
		let window = self.options.window;
		let cache = self.cache.filter(|_| excluded.is_empty());
		let key = self.options.cache_key();

		if let Some(cache) = cache
			&& let Some(graph) = cache.get(&key)?
		{
			tracing::debug!(key = %key, nodes = graph.len(), "Graph cache hit.");

			let report = BuildReport {
				games_total: games.len(),
				nodes: graph.len(),
				from_cache: true,
				skipped: BTreeMap::new(),
			};

			return Ok(BuildOutcome { graph, report });
		}

		let mut nodes = BTreeMap::new();
		let mut skipped = BTreeMap::new();
		let mut progress = Progress::new(games.len());

		for game in games {
			if let Some(cancel) = &self.cancel
				&& cancel.is_cancelled()
			{
				return Err(Error::Cancelled { processed: progress.processed, total: games.len() });
			}

			match self.build_node(curators, game, excluded) {
				Ok(node) => {
					nodes.insert(game.id.clone(), node);
				},
				Err(reason) => {
					skipped.insert(game.id.clone(), reason);
				},
			}

			progress.advance();
		}

		let graph = Graph::new(window, nodes);
		let report =
			BuildReport { games_total: games.len(), nodes: graph.len(), from_cache: false, skipped };

		tracing::info!(
			window = %window,
			nodes = report.nodes,
			excluded = report.count(SkipReason::Excluded),
			no_contributions = report.count(SkipReason::NoContributions),
			no_tags = report.count(SkipReason::NoTags),
			"Built game graph."
		);

		if let Some(cache) = cache {
			cache.put(&key, &graph)?;
		}

		Ok(BuildOutcome { graph, report })
	}

	fn build_node(
		&self,
		curators: &[Curator],
		game: &Game,
		excluded: &BTreeSet<String>,
	) -> Result<GraphNode, SkipReason> {
		if excluded.contains(&game.id) {
			return Err(SkipReason::Excluded);
		}

		let contributions = collect_contributions(curators, &game.id, &self.options);

		if contributions.is_empty()
			&& self.options.zero_contribution_policy == ZeroContributionPolicy::Skip
		{
			return Err(SkipReason::NoContributions);
		}

		let tag_ratios = game
			.tags
			.as_ref()
			.and_then(|tags| TagDistribution::from_counts(tags).ok())
			.ok_or(SkipReason::NoTags)?;

		Ok(GraphNode { tag_ratios, contributions })
	}
}

/// Contributions to one game, in curator order.
pub fn collect_contributions(
	curators: &[Curator],
	game_id: &str,
	options: &BuildOptions,
) -> Vec<Contribution> {
	curators
		.iter()
		.filter_map(|curator| {
			extract_bias(&curator.events, game_id, &options.window, options.enforce_window)
				.map(|bias| Contribution { curator_id: curator.id.clone(), bias })
		})
		.collect()
}

struct Progress {
	total: usize,
	processed: usize,
	last_decile: usize,
}
impl Progress {
	fn new(total: usize) -> Self {
		Self { total, processed: 0, last_decile: 0 }
	}

	fn advance(&mut self) {
		self.processed += 1;

		let decile = self.processed * 10 / self.total.max(1);

		if decile > self.last_decile {
			self.last_decile = decile;

			tracing::debug!(
				processed = self.processed,
				total = self.total,
				fraction = self.processed as f64 / self.total.max(1) as f64,
				"Graph build progress."
			);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn progress_reports_each_decile_once() {
		let mut progress = Progress::new(25);
		let mut deciles = Vec::new();

		for _ in 0..25 {
			progress.advance();
			deciles.push(progress.last_decile);
		}

		assert!(deciles.windows(2).all(|pair| pair[0] <= pair[1]));
		assert_eq!(deciles.last().copied(), Some(10));
		assert_eq!(progress.processed, 25);
	}

	#[test]
	fn policy_labels_match_config_values() {
		assert_eq!(ZeroContributionPolicy::from_label("skip"), Some(ZeroContributionPolicy::Skip));
		assert_eq!(ZeroContributionPolicy::from_label("keep"), Some(ZeroContributionPolicy::Keep));
		assert_eq!(ZeroContributionPolicy::from_label("drop"), None);
		assert_eq!(ZeroContributionPolicy::Keep.label(), "keep");
	}
}
