use std::{
	collections::{BTreeMap, BTreeSet},
	path::PathBuf,
};

use clap::{Parser, ValueEnum};
use color_eyre::eyre;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use steamrec_domain::{TagDistribution, TimeWindow, format_epoch_ms};
use steamrec_service::{NoRecommendationReason, Prediction, SteamRecService};
use steamrec_storage::Dataset;

/// Thirty days, the slice unit.
pub const MONTH_MS: i64 = 30 * 24 * 60 * 60 * 1_000;

#[derive(Debug, Parser)]
#[command(
	version = steamrec_cli::VERSION,
	rename_all = "kebab",
	styles = steamrec_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, short = 'm', value_enum, default_value_t = Mode::Synthetic)]
	pub mode: Mode,
	/// Overrides eval.seed.
	#[arg(long, value_name = "N")]
	pub seed: Option<u64>,
	/// Overrides eval.held_out.
	#[arg(long, value_name = "N")]
	pub held_out: Option<usize>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
	/// Predict a fixed query profile in every slice.
	Synthetic,
	/// Hide sampled games and check whether their curators are predicted.
	HeldOut,
}

/// Contiguous windows going backward from the last collection time.
#[derive(Clone, Copy, Debug)]
pub struct TimeSlicer {
	pub last_collection_ms: i64,
	pub span_ms: i64,
	pub num_spans: u32,
}
impl TimeSlicer {
	pub fn from_months(last_collection_ms: i64, span_months: u32, num_spans: u32) -> Self {
		Self { last_collection_ms, span_ms: MONTH_MS * i64::from(span_months), num_spans }
	}

	/// Most recent slice first.
	pub fn windows(&self) -> steamrec_domain::Result<Vec<TimeWindow>> {
		(0..i64::from(self.num_spans))
			.map(|index| {
				let end_ms = self.last_collection_ms - index * self.span_ms;

				TimeWindow::new(end_ms - self.span_ms, end_ms)
			})
			.collect()
	}
}

#[derive(Debug, Serialize)]
pub struct EvalSettings {
	pub config_path: String,
	pub mode: Mode,
	pub last_collection_ms: i64,
	pub span_months: u32,
	pub num_spans: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub k: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub n: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub held_out: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub seed: Option<u64>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub k_grid: Vec<usize>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub n_grid: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct SliceWindow {
	pub start_ms: i64,
	pub end_ms: i64,
	pub start: String,
	pub end: String,
}
impl From<&TimeWindow> for SliceWindow {
	fn from(window: &TimeWindow) -> Self {
		Self {
			start_ms: window.start_ms,
			end_ms: window.end_ms,
			start: format_epoch_ms(window.start_ms),
			end: format_epoch_ms(window.end_ms),
		}
	}
}

#[derive(Debug, Serialize)]
pub struct SyntheticOutput {
	pub settings: EvalSettings,
	pub slices: Vec<SyntheticSlice>,
	/// How many slices recommended each curator, most frequent first.
	pub curator_counts: Vec<CuratorCount>,
}

#[derive(Debug, Serialize)]
pub struct SyntheticSlice {
	pub index: usize,
	pub window: SliceWindow,
	pub nodes: usize,
	pub from_cache: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub no_recommendation: Option<NoRecommendationReason>,
	pub curators: Vec<SliceCurator>,
}

#[derive(Debug, Serialize)]
pub struct SliceCurator {
	pub curator_id: String,
	pub name: String,
	pub score: f64,
}

#[derive(Debug, Eq, PartialEq, Serialize)]
pub struct CuratorCount {
	pub curator_id: String,
	pub name: String,
	pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct HeldOutOutput {
	pub settings: EvalSettings,
	pub slices: Vec<HeldOutSlice>,
	pub summary: Vec<GridCell>,
}

#[derive(Debug, Serialize)]
pub struct HeldOutSlice {
	pub index: usize,
	pub window: SliceWindow,
	pub nodes: usize,
	pub held_out_game_ids: Vec<String>,
	pub grid: Vec<GridCell>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GridCell {
	pub k: usize,
	pub n: usize,
	pub successes: usize,
	pub trials: usize,
	pub hit_rate: f64,
}

pub struct HeldOutPlan<'a> {
	pub held_out: usize,
	pub seed: u64,
	pub k_grid: &'a [usize],
	pub n_grid: &'a [usize],
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let config = steamrec_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let eval_cfg =
		config.eval.as_ref().ok_or_else(|| eyre::eyre!("Config must include an [eval] section."))?;
	let slicer = TimeSlicer::from_months(
		eval_cfg.last_collection_ms,
		eval_cfg.span_months,
		eval_cfg.num_spans,
	);
	let mut settings = EvalSettings {
		config_path: args.config.display().to_string(),
		mode: args.mode,
		last_collection_ms: eval_cfg.last_collection_ms,
		span_months: eval_cfg.span_months,
		num_spans: eval_cfg.num_spans,
		k: None,
		n: None,
		held_out: None,
		seed: None,
		k_grid: Vec::new(),
		n_grid: Vec::new(),
	};
	let held_out = args.held_out.unwrap_or(eval_cfg.held_out);
	let seed = args.seed.unwrap_or(eval_cfg.seed);
	let k_grid = eval_cfg.k_grid.clone();
	let n_grid = eval_cfg.n_grid.clone();
	let (dataset, _) = Dataset::load(&config.data.curators_path, &config.data.games_path)?;
	let service = match args.mode {
		Mode::Synthetic => SteamRecService::new(config, dataset),
		// Every slice excludes a fresh sample, so snapshots would never be reused.
		Mode::HeldOut => SteamRecService::new(config, dataset).without_cache(),
	};
	let json = match args.mode {
		Mode::Synthetic => {
			let query = service.configured_query()?;
			let (k, n) = (service.cfg.predict.k, service.cfg.predict.n);

			settings.k = Some(k);
			settings.n = Some(n);

			let (slices, curator_counts) = eval_synthetic(&service, &slicer, &query, k, n)?;

			serde_json::to_string_pretty(&SyntheticOutput { settings, slices, curator_counts })?
		},
		Mode::HeldOut => {
			let plan = HeldOutPlan { held_out, seed, k_grid: &k_grid, n_grid: &n_grid };
			let (slices, summary) = eval_held_out(&service, &slicer, &plan)?;

			settings.held_out = Some(held_out);
			settings.seed = Some(seed);
			settings.k_grid = k_grid.clone();
			settings.n_grid = n_grid.clone();

			serde_json::to_string_pretty(&HeldOutOutput { settings, slices, summary })?
		},
	};

	println!("{json}");

	Ok(())
}

/// Predicts `query` in every slice and tallies how often each curator shows up.
pub fn eval_synthetic(
	service: &SteamRecService,
	slicer: &TimeSlicer,
	query: &TagDistribution,
	k: usize,
	n: usize,
) -> color_eyre::Result<(Vec<SyntheticSlice>, Vec<CuratorCount>)> {
	let mut slices = Vec::new();
	let mut counts: BTreeMap<String, usize> = BTreeMap::new();

	for (index, window) in slicer.windows()?.into_iter().enumerate() {
		let outcome = service.build_graph(window, &BTreeSet::new(), None)?;
		let prediction = steamrec_service::predict(&outcome.graph, query, k, n);
		let no_recommendation = match &prediction {
			Prediction::NoRecommendation { reason } => Some(*reason),
			Prediction::Ranked { .. } => None,
		};
		let curators: Vec<SliceCurator> = prediction
			.curators()
			.iter()
			.map(|curator| SliceCurator {
				curator_id: curator.curator_id.clone(),
				name: service.dataset.curator_name(&curator.curator_id).to_string(),
				score: curator.score,
			})
			.collect();

		for curator in &curators {
			*counts.entry(curator.curator_id.clone()).or_insert(0) += 1;
		}

		tracing::info!(slice = index, window = %window, curators = curators.len(), "Evaluated slice.");

		slices.push(SyntheticSlice {
			index,
			window: SliceWindow::from(&window),
			nodes: outcome.report.nodes,
			from_cache: outcome.report.from_cache,
			no_recommendation,
			curators,
		});
	}

	let mut curator_counts: Vec<CuratorCount> = counts
		.into_iter()
		.map(|(curator_id, count)| CuratorCount {
			name: service.dataset.curator_name(&curator_id).to_string(),
			curator_id,
			count,
		})
		.collect();

	curator_counts.sort_by(|left, right| {
		right.count.cmp(&left.count).then_with(|| left.curator_id.cmp(&right.curator_id))
	});

	Ok((slices, curator_counts))
}

/// Hides sampled games from each slice's graph and scores the `(k, n)` grid on them.
pub fn eval_held_out(
	service: &SteamRecService,
	slicer: &TimeSlicer,
	plan: &HeldOutPlan<'_>,
) -> color_eyre::Result<(Vec<HeldOutSlice>, Vec<GridCell>)> {
	let max_n = plan.n_grid.iter().copied().max().unwrap_or(0);
	let mut rng = StdRng::seed_from_u64(plan.seed);
	let mut slices = Vec::new();
	let mut totals: BTreeMap<(usize, usize), usize> = BTreeMap::new();

	for (index, window) in slicer.windows()?.into_iter().enumerate() {
		let held_out = sample_held_out(&service.dataset, &window, plan.held_out, &mut rng);
		let excluded: BTreeSet<String> = held_out.iter().cloned().collect();
		let outcome = service.build_graph(window, &excluded, None)?;
		let mut successes: BTreeMap<(usize, usize), usize> = BTreeMap::new();

		for game_id in &held_out {
			let Some(query) = held_out_query(&service.dataset, game_id) else {
				continue;
			};

			for &k in plan.k_grid {
				let prediction = steamrec_service::predict(&outcome.graph, &query, k, max_n);
				let ids = prediction.curator_ids();

				for &n in plan.n_grid {
					let hit = ids
						.iter()
						.take(n)
						.filter_map(|curator_id| service.dataset.curator(curator_id))
						.any(|curator| curator.endorses(game_id));

					*successes.entry((k, n)).or_insert(0) += usize::from(hit);
				}
			}
		}

		let trials = held_out.len();
		let grid = grid_cells(plan, trials, |k, n| successes.get(&(k, n)).copied().unwrap_or(0));

		for cell in &grid {
			*totals.entry((cell.k, cell.n)).or_insert(0) += cell.successes;
		}

		tracing::info!(
			slice = index,
			window = %window,
			held_out = trials,
			nodes = outcome.report.nodes,
			"Evaluated held-out slice."
		);

		slices.push(HeldOutSlice {
			index,
			window: SliceWindow::from(&window),
			nodes: outcome.report.nodes,
			held_out_game_ids: held_out,
			grid,
		});
	}

	let trials: usize = slices.iter().map(|slice| slice.held_out_game_ids.len()).sum();
	let summary = grid_cells(plan, trials, |k, n| totals.get(&(k, n)).copied().unwrap_or(0));

	Ok((slices, summary))
}

/// Samples up to `count` games that were positively recommended inside `window` and
/// have a usable tag histogram. Returned ids are sorted.
pub fn sample_held_out(
	dataset: &Dataset,
	window: &TimeWindow,
	count: usize,
	rng: &mut StdRng,
) -> Vec<String> {
	let endorsed: BTreeSet<&str> = dataset
		.curators()
		.iter()
		.flat_map(|curator| curator.events.iter())
		.filter(|event| event.is_positive() && window.contains(event.epoch))
		.map(|event| event.appid.as_str())
		.collect();
	let candidates: Vec<&str> = dataset
		.games()
		.iter()
		.filter(|game| endorsed.contains(game.id.as_str()))
		.filter(|game| held_out_query(dataset, &game.id).is_some())
		.map(|game| game.id.as_str())
		.collect();
	let mut sampled: Vec<String> =
		candidates.choose_multiple(rng, count).map(|game_id| game_id.to_string()).collect();

	sampled.sort();

	sampled
}

fn held_out_query(dataset: &Dataset, game_id: &str) -> Option<TagDistribution> {
	dataset.game(game_id)?.tags.as_ref().and_then(|tags| TagDistribution::from_counts(tags).ok())
}

fn grid_cells<F>(plan: &HeldOutPlan<'_>, trials: usize, successes: F) -> Vec<GridCell>
where
	F: Fn(usize, usize) -> usize,
{
	let mut out = Vec::with_capacity(plan.k_grid.len() * plan.n_grid.len());

	for &k in plan.k_grid {
		for &n in plan.n_grid {
			let successes = successes(k, n);
			let hit_rate = if trials == 0 { 0.0 } else { successes as f64 / trials as f64 };

			out.push(GridCell { k, n, successes, trials, hit_rate });
		}
	}

	out
}
