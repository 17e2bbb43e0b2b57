pub mod graph;
pub mod ranking;

mod error;

pub use error::{Error, Result};
pub use graph::{
	BuildOptions, BuildOutcome, BuildReport, CancelFlag, GraphBuilder, SkipReason,
	ZeroContributionPolicy,
};
pub use ranking::{
	Neighbor, NoRecommendationReason, Prediction, RankedCurator, distance, nearest_neighbors,
	predict, predict_one,
};

use std::collections::BTreeSet;

use steamrec_config::Config;
use steamrec_domain::{TagDistribution, TimeWindow};
use steamrec_storage::{Dataset, FileGraphCache, GraphCache};

pub struct SteamRecService {
	pub cfg: Config,
	pub dataset: Dataset,
	cache: Option<Box<dyn GraphCache>>,
}
impl SteamRecService {
	/// Wires the file snapshot cache when `cache.enabled` is set.
	pub fn new(cfg: Config, dataset: Dataset) -> Self {
		let cache = if cfg.cache.enabled {
			cfg.cache
				.dir
				.clone()
				.map(|dir| Box::new(FileGraphCache::new(dir)) as Box<dyn GraphCache>)
		} else {
			None
		};

		Self { cfg, dataset, cache }
	}

	pub fn with_cache(mut self, cache: Box<dyn GraphCache>) -> Self {
		self.cache = Some(cache);

		self
	}

	pub fn without_cache(mut self) -> Self {
		self.cache = None;

		self
	}

	pub fn cache(&self) -> Option<&dyn GraphCache> {
		self.cache.as_deref()
	}

	pub fn configured_window(&self) -> Result<TimeWindow> {
		Ok(TimeWindow::new(self.cfg.window.start_ms, self.cfg.window.end_ms)?)
	}

	pub fn build_options(&self, window: TimeWindow) -> Result<BuildOptions> {
		let zero_contribution_policy =
			ZeroContributionPolicy::from_label(&self.cfg.graph.zero_contribution_policy)
				.ok_or_else(|| Error::InvalidRequest {
					message: format!(
						"Unknown zero contribution policy: {}.",
						self.cfg.graph.zero_contribution_policy
					),
				})?;

		Ok(BuildOptions { window, enforce_window: self.cfg.window.enforce, zero_contribution_policy })
	}

	/// Builds the graph for `window` from the loaded dataset, through the cache if any.
	pub fn build_graph(
		&self,
		window: TimeWindow,
		excluded: &BTreeSet<String>,
		cancel: Option<&CancelFlag>,
	) -> Result<BuildOutcome> {
		let mut builder = GraphBuilder::new(self.build_options(window)?);

		if let Some(cache) = self.cache() {
			builder = builder.with_cache(cache);
		}
		if let Some(cancel) = cancel {
			builder = builder.with_cancel(cancel.clone());
		}

		builder.build(self.dataset.curators(), self.dataset.games(), excluded)
	}

	/// Query profile from the `[query.tags]` table.
	pub fn configured_query(&self) -> Result<TagDistribution> {
		let query = self.cfg.query.as_ref().ok_or_else(|| Error::InvalidRequest {
			message: "No [query.tags] profile is configured.".to_string(),
		})?;

		Ok(TagDistribution::from_weights(
			query.tags.iter().map(|(tag, weight)| (tag.clone(), *weight)),
		)?)
	}
}
