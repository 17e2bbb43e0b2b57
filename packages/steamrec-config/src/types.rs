use std::{collections::BTreeMap, path::PathBuf};

use serde::Deserialize;

/// Launch of Steam curators, roughly 2014-09-22.
pub const DEFAULT_WINDOW_START_MS: i64 = 1_411_344_000_000;
/// Last collection of the curator dataset, 2017-05-05.
pub const DEFAULT_WINDOW_END_MS: i64 = 1_494_012_977_000;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub data: Data,
	#[serde(default)]
	pub window: Window,
	#[serde(default)]
	pub graph: Graph,
	#[serde(default)]
	pub cache: Cache,
	#[serde(default)]
	pub predict: Predict,
	pub query: Option<Query>,
	pub eval: Option<Eval>,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Data {
	pub curators_path: PathBuf,
	pub games_path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Window {
	#[serde(default = "default_window_start_ms")]
	pub start_ms: i64,
	#[serde(default = "default_window_end_ms")]
	pub end_ms: i64,
	/// Drop events outside the window instead of only clamping the bias at the start.
	#[serde(default = "default_true")]
	pub enforce: bool,
}
impl Default for Window {
	fn default() -> Self {
		Self {
			start_ms: default_window_start_ms(),
			end_ms: default_window_end_ms(),
			enforce: default_true(),
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Graph {
	/// Either "skip" or "keep".
	#[serde(default = "default_zero_contribution_policy")]
	pub zero_contribution_policy: String,
}
impl Default for Graph {
	fn default() -> Self {
		Self { zero_contribution_policy: default_zero_contribution_policy() }
	}
}

#[derive(Debug, Default, Deserialize)]
pub struct Cache {
	#[serde(default)]
	pub enabled: bool,
	pub dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct Predict {
	#[serde(default = "default_k")]
	pub k: usize,
	#[serde(default = "default_n")]
	pub n: usize,
}
impl Default for Predict {
	fn default() -> Self {
		Self { k: default_k(), n: default_n() }
	}
}

#[derive(Debug, Deserialize)]
pub struct Query {
	/// Tag name to weight. Used as given, without re-normalization.
	pub tags: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
pub struct Eval {
	#[serde(default = "default_window_end_ms")]
	pub last_collection_ms: i64,
	/// Width of one slice in 30-day months. 1 for months, 4 for quarters.
	#[serde(default = "default_span_months")]
	pub span_months: u32,
	#[serde(default = "default_num_spans")]
	pub num_spans: u32,
	#[serde(default = "default_held_out")]
	pub held_out: usize,
	#[serde(default)]
	pub seed: u64,
	#[serde(default = "default_k_grid")]
	pub k_grid: Vec<usize>,
	#[serde(default = "default_n_grid")]
	pub n_grid: Vec<usize>,
}

fn default_true() -> bool {
	true
}

fn default_window_start_ms() -> i64 {
	DEFAULT_WINDOW_START_MS
}

fn default_window_end_ms() -> i64 {
	DEFAULT_WINDOW_END_MS
}

fn default_zero_contribution_policy() -> String {
	"skip".to_string()
}

fn default_k() -> usize {
	50
}

fn default_n() -> usize {
	10
}

fn default_span_months() -> u32 {
	4
}

fn default_num_spans() -> u32 {
	4
}

fn default_held_out() -> usize {
	10
}

fn default_k_grid() -> Vec<usize> {
	vec![1, 5, 10, 20, 50]
}

fn default_n_grid() -> Vec<usize> {
	vec![1, 5, 10]
}
