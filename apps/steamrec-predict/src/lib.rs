use std::{collections::BTreeSet, path::PathBuf};

use clap::Parser;
use color_eyre::eyre;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use steamrec_domain::{TagDistribution, TimeWindow, format_epoch_ms};
use steamrec_service::{
	BuildReport, Neighbor, NoRecommendationReason, Prediction, SkipReason, SteamRecService,
};
use steamrec_storage::Dataset;

#[derive(Debug, Parser)]
#[command(
	version = steamrec_cli::VERSION,
	rename_all = "kebab",
	styles = steamrec_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Number of nearest games to aggregate. Defaults to predict.k.
	#[arg(long, short = 'k', value_name = "N")]
	pub k: Option<usize>,
	/// Number of curators to return. Defaults to predict.n.
	#[arg(long, short = 'n', value_name = "N")]
	pub n: Option<usize>,
	/// Query tag weight; repeat to build a profile. Replaces [query.tags].
	#[arg(long = "tag", value_name = "NAME=WEIGHT", value_parser = steamrec_cli::parse_key_value)]
	pub tags: Vec<(String, f64)>,
	/// Build the graph from scratch and leave snapshots untouched.
	#[arg(long)]
	pub no_cache: bool,
	/// Include the selected neighbor games in the output.
	#[arg(long)]
	pub explain: bool,
}

#[derive(Debug, Serialize)]
pub struct PredictOutput {
	pub window: WindowInfo,
	pub k: usize,
	pub n: usize,
	pub graph: GraphInfo,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub neighbors: Option<Vec<Neighbor>>,
	#[serde(flatten)]
	pub result: PredictResult,
}

#[derive(Debug, Serialize)]
pub struct WindowInfo {
	pub start_ms: i64,
	pub end_ms: i64,
	pub start: String,
	pub end: String,
}
impl From<&TimeWindow> for WindowInfo {
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
pub struct GraphInfo {
	pub nodes: usize,
	pub from_cache: bool,
	pub skipped_no_contributions: usize,
	pub skipped_no_tags: usize,
}
impl From<&BuildReport> for GraphInfo {
	fn from(report: &BuildReport) -> Self {
		Self {
			nodes: report.nodes,
			from_cache: report.from_cache,
			skipped_no_contributions: report.count(SkipReason::NoContributions),
			skipped_no_tags: report.count(SkipReason::NoTags),
		}
	}
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictResult {
	Ranked { curators: Vec<NamedCurator> },
	NoRecommendation { reason: NoRecommendationReason },
}

#[derive(Debug, Serialize)]
pub struct NamedCurator {
	pub curator_id: String,
	pub name: String,
	pub score: f64,
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let config = steamrec_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let (dataset, _) = Dataset::load(&config.data.curators_path, &config.data.games_path)?;
	let mut service = SteamRecService::new(config, dataset);

	if args.no_cache {
		service = service.without_cache();
	}

	let output = predict_with(&service, &args)?;
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

/// Builds the configured window's graph and answers one query.
pub fn predict_with(service: &SteamRecService, args: &Args) -> color_eyre::Result<PredictOutput> {
	let k = args.k.unwrap_or(service.cfg.predict.k);
	let n = args.n.unwrap_or(service.cfg.predict.n);

	if k == 0 || n == 0 {
		return Err(eyre::eyre!("--k and --n must be greater than zero."));
	}

	let query = resolve_query(service, &args.tags)?;
	let window = service.configured_window()?;
	let outcome = service.build_graph(window, &BTreeSet::new(), None)?;
	let prediction = steamrec_service::predict(&outcome.graph, &query, k, n);
	let neighbors =
		args.explain.then(|| steamrec_service::nearest_neighbors(&outcome.graph, &query, k));

	if let Prediction::NoRecommendation { reason } = &prediction {
		tracing::warn!(?reason, "No curator recommendation for the query.");
	}

	Ok(PredictOutput {
		window: WindowInfo::from(&window),
		k,
		n,
		graph: GraphInfo::from(&outcome.report),
		neighbors,
		result: name_curators(&service.dataset, prediction),
	})
}

fn resolve_query(
	service: &SteamRecService,
	tags: &[(String, f64)],
) -> color_eyre::Result<TagDistribution> {
	if tags.is_empty() {
		return Ok(service.configured_query()?);
	}

	Ok(TagDistribution::from_weights(tags.iter().cloned())?)
}

fn name_curators(dataset: &Dataset, prediction: Prediction) -> PredictResult {
	match prediction {
		Prediction::Ranked { curators } => PredictResult::Ranked {
			curators: curators
				.into_iter()
				.map(|curator| NamedCurator {
					name: dataset.curator_name(&curator.curator_id).to_string(),
					curator_id: curator.curator_id,
					score: curator.score,
				})
				.collect(),
		},
		Prediction::NoRecommendation { reason } => PredictResult::NoRecommendation { reason },
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use steamrec_config::Config;
	use steamrec_testkit::sample_catalog;

	fn service() -> SteamRecService {
		let cfg = toml_config();
		let (curators, games) = sample_catalog();

		SteamRecService::new(cfg, Dataset::new(curators, games))
	}

	fn toml_config() -> Config {
		let path = std::env::temp_dir().join(format!(
			"steamrec_predict_test_{}_{:?}.toml",
			std::process::id(),
			std::thread::current().id()
		));
		let payload = r#"
[service]
log_level = "info"

[data]
curators_path = "curators.json"
games_path    = "games.json"

[predict]
k = 1
n = 5

[query.tags]
Puzzle = 0.9
Casual = 0.1
"#;

		std::fs::write(&path, payload).expect("Failed to write test config.");

		let cfg = steamrec_config::load(&path).expect("Test config must load.");

		std::fs::remove_file(&path).expect("Failed to remove test config.");

		cfg
	}

	fn args(tags: &[&str], explain: bool) -> Args {
		let mut argv = vec!["steamrec-predict".to_string(), "--config".to_string(), "x".to_string()];

		for tag in tags {
			argv.push("--tag".to_string());
			argv.push(tag.to_string());
		}
		if explain {
			argv.push("--explain".to_string());
		}

		Args::try_parse_from(argv).expect("Arguments must parse.")
	}

	#[test]
	fn configured_query_names_the_puzzle_curator_first() {
		let output = predict_with(&service(), &args(&[], false)).expect("Prediction must succeed.");
		let PredictResult::Ranked { curators } = &output.result else {
			panic!("Expected a ranked result, got {:?}.", output.result);
		};

		assert_eq!(curators[0].curator_id, "carol");
		assert_eq!(curators[0].name, "Curator carol");
		assert_eq!(output.graph.nodes, 3);
		assert!(output.neighbors.is_none());
	}

	#[test]
	fn tag_arguments_replace_the_configured_query() {
		let output = predict_with(&service(), &args(&["RPG=0.8", "Fantasy=0.2"], true))
			.expect("Prediction must succeed.");
		let neighbors = output.neighbors.expect("Explain output must list neighbors.");

		assert_eq!(neighbors.len(), 1);
		assert_eq!(neighbors[0].game_id, "rpg-1");

		let json = serde_json::to_value(&output.result).expect("Failed to encode result.");

		assert_eq!(json["status"], "ranked");
		assert_eq!(json["curators"][0]["curator_id"], "alice");
	}
}
