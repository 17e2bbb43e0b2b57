use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Normalized tag histogram of a game, or a caller-supplied query profile.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TagDistribution(BTreeMap<String, f64>);
impl TagDistribution {
	/// Divides every count by the histogram total.
	pub fn from_counts(counts: &BTreeMap<String, u64>) -> Result<Self> {
		let total: f64 = counts.values().map(|count| *count as f64).sum();

		if counts.is_empty() || total <= 0.0 {
			return Err(Error::EmptyHistogram);
		}

		let ratios =
			counts.iter().map(|(tag, count)| (tag.clone(), *count as f64 / total)).collect();

		Ok(Self(ratios))
	}

	/// Builds a query profile from explicit weights. Weights are kept as given.
	pub fn from_weights<I, S>(weights: I) -> Result<Self>
	where
		I: IntoIterator<Item = (S, f64)>,
		S: Into<String>,
	{
		let mut out = BTreeMap::new();

		for (tag, weight) in weights {
			let tag = tag.into();

			if !weight.is_finite() || weight < 0.0 {
				return Err(Error::InvalidWeight { tag, weight });
			}

			out.insert(tag, weight);
		}

		Ok(Self(out))
	}

	pub fn get(&self, tag: &str) -> f64 {
		self.0.get(tag).copied().unwrap_or(0.0)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
		self.0.iter().map(|(tag, ratio)| (tag.as_str(), *ratio))
	}

	pub fn tags(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn total(&self) -> f64 {
		self.0.values().sum()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
