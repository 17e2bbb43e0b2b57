use std::{
	collections::BTreeMap,
	fs,
	path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::Value;

use steamrec_domain::{Curator, Game, RecommendationEvent};

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct CuratorRecord {
	#[serde(default)]
	name: String,
	list: Vec<RecommendationEvent>,
}

#[derive(Debug, Deserialize)]
struct GameRecord {
	#[serde(default)]
	tags: Option<TagsField>,
}

/// Untagged games come through as an empty JSON array rather than an empty object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagsField {
	Counts(BTreeMap<String, u64>),
	Empty([(); 0]),
}
impl TagsField {
	fn into_counts(self) -> Option<BTreeMap<String, u64>> {
		match self {
			Self::Counts(counts) => Some(counts),
			Self::Empty(_) => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
	pub curators_loaded: usize,
	pub curators_skipped: usize,
	pub games_loaded: usize,
	pub games_skipped: usize,
}

/// Curators and games, each sorted by id.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
	curators: Vec<Curator>,
	games: Vec<Game>,
}
impl Dataset {
	pub fn new(mut curators: Vec<Curator>, mut games: Vec<Game>) -> Self {
		curators.sort_by(|left, right| left.id.cmp(&right.id));
		games.sort_by(|left, right| left.id.cmp(&right.id));

		Self { curators, games }
	}

	pub fn load(curators_path: &Path, games_path: &Path) -> Result<(Self, LoadReport)> {
		let curators_raw = read_document(curators_path)?;
		let games_raw = read_document(games_path)?;
		let (curators, curators_skipped) = parse_curators_document(&curators_raw)
			.map_err(|err| Error::ParseDataset { path: curators_path.to_path_buf(), source: err })?;
		let (games, games_skipped) = parse_games_document(&games_raw)
			.map_err(|err| Error::ParseDataset { path: games_path.to_path_buf(), source: err })?;
		let report = LoadReport {
			curators_loaded: curators.len(),
			curators_skipped,
			games_loaded: games.len(),
			games_skipped,
		};

		tracing::info!(
			curators = report.curators_loaded,
			curators_skipped = report.curators_skipped,
			games = report.games_loaded,
			games_skipped = report.games_skipped,
			"Loaded dataset."
		);

		Ok((Self::new(curators, games), report))
	}

	pub fn curators(&self) -> &[Curator] {
		&self.curators
	}

	pub fn games(&self) -> &[Game] {
		&self.games
	}

	pub fn curator(&self, curator_id: &str) -> Option<&Curator> {
		self.curators
			.binary_search_by(|curator| curator.id.as_str().cmp(curator_id))
			.ok()
			.map(|idx| &self.curators[idx])
	}

	pub fn game(&self, game_id: &str) -> Option<&Game> {
		self.games
			.binary_search_by(|game| game.id.as_str().cmp(game_id))
			.ok()
			.map(|idx| &self.games[idx])
	}

	/// Display name of a curator, or the id itself when unknown or unnamed.
	pub fn curator_name<'a>(&'a self, curator_id: &'a str) -> &'a str {
		self.curator(curator_id)
			.map(|curator| curator.name.as_str())
			.filter(|name| !name.trim().is_empty())
			.unwrap_or(curator_id)
	}
}

/// Parses a curators document. Malformed entries are skipped and counted.
pub fn parse_curators_document(raw: &str) -> serde_json::Result<(Vec<Curator>, usize)> {
	let entries: BTreeMap<String, Value> = serde_json::from_str(raw)?;
	let mut curators = Vec::with_capacity(entries.len());
	let mut skipped = 0;

	for (id, value) in entries {
		match serde_json::from_value::<CuratorRecord>(value) {
			Ok(record) => curators.push(Curator { id, name: record.name, events: record.list }),
			Err(err) => {
				tracing::warn!(curator_id = %id, error = %err, "Skipping malformed curator.");

				skipped += 1;
			},
		}
	}

	Ok((curators, skipped))
}

/// Parses a games document. Malformed entries are skipped and counted.
pub fn parse_games_document(raw: &str) -> serde_json::Result<(Vec<Game>, usize)> {
	let entries: BTreeMap<String, Value> = serde_json::from_str(raw)?;
	let mut games = Vec::with_capacity(entries.len());
	let mut skipped = 0;

	for (id, value) in entries {
		match serde_json::from_value::<GameRecord>(value) {
			Ok(record) => games.push(Game { id, tags: record.tags.and_then(TagsField::into_counts) }),
			Err(err) => {
				tracing::warn!(game_id = %id, error = %err, "Skipping malformed game.");

				skipped += 1;
			},
		}
	}

	Ok((games, skipped))
}

fn read_document(path: &Path) -> Result<String> {
	fs::read_to_string(path)
		.map_err(|err| Error::ReadDataset { path: PathBuf::from(path), source: err })
}
