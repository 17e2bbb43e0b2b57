use std::fmt;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{Error, RecommendationEvent, Result};

/// Inclusive `[start_ms, end_ms]` range used to filter and decay recommendations.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "RawTimeWindow")]
pub struct TimeWindow {
	pub start_ms: i64,
	pub end_ms: i64,
}
impl TimeWindow {
	pub fn new(start_ms: i64, end_ms: i64) -> Result<Self> {
		if start_ms >= end_ms {
			return Err(Error::InvalidWindow { start_ms, end_ms });
		}

		Ok(Self { start_ms, end_ms })
	}

	pub fn span_ms(&self) -> i64 {
		self.end_ms.saturating_sub(self.start_ms)
	}

	pub fn contains(&self, epoch_ms: i64) -> bool {
		(self.start_ms..=self.end_ms).contains(&epoch_ms)
	}

	/// Signed recency weight of an event: 0 at `start_ms`, 1 at `end_ms`.
	///
	/// Clamped below at zero; not capped above one, so callers that care drop
	/// late events through [`TimeWindow::contains`] first.
	pub fn bias(&self, epoch_ms: i64, recommended: bool) -> f64 {
		let magnitude =
			(epoch_ms.saturating_sub(self.start_ms) as f64 / self.span_ms() as f64).max(0.0);

		if recommended { magnitude } else { -magnitude }
	}
}
impl TryFrom<RawTimeWindow> for TimeWindow {
	type Error = Error;

	fn try_from(raw: RawTimeWindow) -> Result<Self> {
		Self::new(raw.start_ms, raw.end_ms)
	}
}
impl fmt::Display for TimeWindow {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}..{}", format_epoch_ms(self.start_ms), format_epoch_ms(self.end_ms))
	}
}

#[derive(Deserialize)]
struct RawTimeWindow {
	start_ms: i64,
	end_ms: i64,
}

/// Bias of a curator's recommendation of `game_id`, if the curator has one that counts.
///
/// Only the first logged event for the game is considered. An informational first
/// event yields no contribution even when a later event exists.
pub fn extract_bias(
	events: &[RecommendationEvent],
	game_id: &str,
	window: &TimeWindow,
	enforce_window: bool,
) -> Option<f64> {
	let event = events.iter().find(|event| event.appid == game_id)?;

	if event.info {
		return None;
	}
	if enforce_window && !window.contains(event.epoch) {
		return None;
	}

	Some(window.bias(event.epoch, event.recommended))
}

/// RFC 3339 rendering of a millisecond timestamp, falling back to the raw number.
pub fn format_epoch_ms(epoch_ms: i64) -> String {
	OffsetDateTime::from_unix_timestamp_nanos(i128::from(epoch_ms) * 1_000_000)
		.ok()
		.and_then(|datetime| datetime.format(&Rfc3339).ok())
		.unwrap_or_else(|| epoch_ms.to_string())
}
