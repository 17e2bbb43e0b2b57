mod error;

pub use error::{Error, Result};

use std::{
	fs,
	path::{Path, PathBuf},
};

use serde_json::{Map, Value, json};
use tempfile::TempDir;

use steamrec_domain::{Curator, Game, RecommendationEvent, TimeWindow};

/// Launch of Steam curators.
pub const WINDOW_START_MS: i64 = 1_411_344_000_000;
/// Last collection of the curator dataset.
pub const WINDOW_END_MS: i64 = 1_494_012_977_000;
pub const DAY_MS: i64 = 24 * 60 * 60 * 1_000;

pub fn full_window() -> TimeWindow {
	TimeWindow { start_ms: WINDOW_START_MS, end_ms: WINDOW_END_MS }
}

pub fn endorse(appid: &str, epoch: i64) -> RecommendationEvent {
	RecommendationEvent { appid: appid.to_string(), recommended: true, info: false, epoch }
}

pub fn reject(appid: &str, epoch: i64) -> RecommendationEvent {
	RecommendationEvent { appid: appid.to_string(), recommended: false, info: false, epoch }
}

pub fn info(appid: &str, epoch: i64) -> RecommendationEvent {
	RecommendationEvent { appid: appid.to_string(), recommended: true, info: true, epoch }
}

pub fn curator(id: &str, events: Vec<RecommendationEvent>) -> Curator {
	Curator { id: id.to_string(), name: format!("Curator {id}"), events }
}

pub fn game(id: &str, tags: &[(&str, u64)]) -> Game {
	Game {
		id: id.to_string(),
		tags: Some(tags.iter().map(|(tag, count)| (tag.to_string(), *count)).collect()),
	}
}

pub fn untagged_game(id: &str) -> Game {
	Game { id: id.to_string(), tags: None }
}

/// Renders curators in the on-disk document shape.
pub fn curators_document(curators: &[Curator]) -> Value {
	let mut out = Map::new();

	for curator in curators {
		let list: Vec<Value> = curator
			.events
			.iter()
			.map(|event| {
				json!({
					"appid": event.appid,
					"recommended": event.recommended,
					"info": event.info,
					"epoch": event.epoch,
				})
			})
			.collect();

		out.insert(curator.id.clone(), json!({ "name": curator.name, "list": list }));
	}

	Value::Object(out)
}

/// Renders games in the on-disk document shape.
pub fn games_document(games: &[Game]) -> Value {
	let mut out = Map::new();

	for game in games {
		let entry = match &game.tags {
			Some(tags) => json!({ "tags": tags }),
			None => json!({}),
		};

		out.insert(game.id.clone(), entry);
	}

	Value::Object(out)
}

/// Scratch directory holding dataset documents; removed on drop.
pub struct Workspace {
	dir: TempDir,
}
impl Workspace {
	pub fn new() -> Result<Self> {
		let dir = tempfile::Builder::new().prefix("steamrec_test_").tempdir()?;

		Ok(Self { dir })
	}

	pub fn path(&self) -> &Path {
		self.dir.path()
	}

	pub fn write_json(&self, name: &str, value: &Value) -> Result<PathBuf> {
		let path = self.dir.path().join(name);

		fs::write(&path, serde_json::to_vec_pretty(value)?)?;

		Ok(path)
	}

	pub fn write_raw(&self, name: &str, raw: &str) -> Result<PathBuf> {
		let path = self.dir.path().join(name);

		fs::write(&path, raw)?;

		Ok(path)
	}

	/// Writes both documents and returns `(curators_path, games_path)`.
	pub fn write_dataset(&self, curators: &[Curator], games: &[Game]) -> Result<(PathBuf, PathBuf)> {
		let curators_path = self.write_json("curators.json", &curators_document(curators))?;
		let games_path = self.write_json("games.json", &games_document(games))?;

		Ok((curators_path, games_path))
	}

	pub fn child(&self, name: &str) -> Result<PathBuf> {
		if name.contains(std::path::MAIN_SEPARATOR) {
			return Err(Error::Message(format!("Child name must be a single component: {name}.")));
		}

		Ok(self.dir.path().join(name))
	}
}

/// A small catalog with distinct genre clusters and curators of known taste.
///
/// - `rpg-1`, `rpg-2`: RPG-heavy, endorsed by `alice`, `bob` endorses `rpg-2`.
/// - `puzzle-1`: puzzle-heavy, endorsed by `carol`, rejected by `alice`.
/// - `untagged`: endorsed by `carol`, no tags.
/// - `ignored`: tagged, only an informational post by `bob`.
pub fn sample_catalog() -> (Vec<Curator>, Vec<Game>) {
	let mid = WINDOW_START_MS + (WINDOW_END_MS - WINDOW_START_MS) / 2;
	let late = WINDOW_END_MS - 30 * DAY_MS;
	let curators = vec![
		curator("alice", vec![endorse("rpg-1", late), endorse("rpg-2", mid), reject("puzzle-1", late)]),
		curator("bob", vec![endorse("rpg-2", late), info("ignored", late)]),
		curator("carol", vec![endorse("puzzle-1", late), endorse("untagged", late)]),
	];
	let games = vec![
		game("rpg-1", &[("RPG", 8), ("Fantasy", 2)]),
		game("rpg-2", &[("RPG", 6), ("Fantasy", 3), ("Open World", 1)]),
		game("puzzle-1", &[("Puzzle", 9), ("Casual", 1)]),
		game("ignored", &[("Racing", 5)]),
		untagged_game("untagged"),
	];

	(curators, games)
}
