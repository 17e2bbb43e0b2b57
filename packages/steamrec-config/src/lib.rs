mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, Config, DEFAULT_WINDOW_END_MS, DEFAULT_WINDOW_START_MS, Data, Eval, Graph, Predict,
	Query, Service, Window,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	for (label, path) in
		[("data.curators_path", &cfg.data.curators_path), ("data.games_path", &cfg.data.games_path)]
	{
		if path.as_os_str().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.window.start_ms >= cfg.window.end_ms {
		return Err(Error::Validation {
			message: "window.start_ms must be less than window.end_ms.".to_string(),
		});
	}
	if !matches!(cfg.graph.zero_contribution_policy.as_str(), "skip" | "keep") {
		return Err(Error::Validation {
			message: "graph.zero_contribution_policy must be one of skip or keep.".to_string(),
		});
	}
	if cfg.cache.enabled && cfg.cache.dir.is_none() {
		return Err(Error::Validation {
			message: "cache.dir must be set when cache.enabled is true.".to_string(),
		});
	}
	if cfg.predict.k == 0 {
		return Err(Error::Validation {
			message: "predict.k must be greater than zero.".to_string(),
		});
	}
	if cfg.predict.n == 0 {
		return Err(Error::Validation {
			message: "predict.n must be greater than zero.".to_string(),
		});
	}

	if let Some(query) = cfg.query.as_ref() {
		if query.tags.is_empty() {
			return Err(Error::Validation {
				message: "query.tags must be non-empty when [query] is present.".to_string(),
			});
		}

		for (tag, weight) in &query.tags {
			if !weight.is_finite() || *weight < 0.0 {
				return Err(Error::Validation {
					message: format!(
						"query.tags.{tag} must be a finite number, zero or greater."
					),
				});
			}
		}
	}
	if let Some(eval) = cfg.eval.as_ref() {
		if eval.span_months == 0 {
			return Err(Error::Validation {
				message: "eval.span_months must be greater than zero.".to_string(),
			});
		}
		if eval.num_spans == 0 {
			return Err(Error::Validation {
				message: "eval.num_spans must be greater than zero.".to_string(),
			});
		}

		for (label, grid) in [("eval.k_grid", &eval.k_grid), ("eval.n_grid", &eval.n_grid)] {
			if grid.is_empty() {
				return Err(Error::Validation { message: format!("{label} must be non-empty.") });
			}
			if grid.contains(&0) {
				return Err(Error::Validation {
					message: format!("{label} entries must be greater than zero."),
				});
			}
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.cache.dir.as_deref().map(|dir| dir.to_string_lossy().trim().is_empty()).unwrap_or(false) {
		cfg.cache.dir = None;
	}

	cfg.graph.zero_contribution_policy =
		cfg.graph.zero_contribution_policy.trim().to_ascii_lowercase();

	if let Some(eval) = cfg.eval.as_mut() {
		eval.k_grid.sort_unstable();
		eval.k_grid.dedup();
		eval.n_grid.sort_unstable();
		eval.n_grid.dedup();
	}
}
