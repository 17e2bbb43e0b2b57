use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One entry of a curator's recommendation log.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RecommendationEvent {
	pub appid: String,
	pub recommended: bool,
	/// Informational posts carry no endorsement and never contribute.
	pub info: bool,
	/// Milliseconds since the Unix epoch.
	pub epoch: i64,
}
impl RecommendationEvent {
	pub fn is_positive(&self) -> bool {
		self.recommended && !self.info
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Curator {
	pub id: String,
	pub name: String,
	pub events: Vec<RecommendationEvent>,
}
impl Curator {
	pub fn endorses(&self, game_id: &str) -> bool {
		self.events.iter().any(|event| event.appid == game_id && event.is_positive())
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Game {
	pub id: String,
	pub tags: Option<BTreeMap<String, u64>>,
}
impl Game {
	pub fn has_tags(&self) -> bool {
		self.tags.as_ref().map(|tags| !tags.is_empty()).unwrap_or(false)
	}
}
