mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Analytics, CompletionProviderConfig, Config, EmbeddingProviderConfig, Index, Providers,
	Retrieval, Sync, ViewOverride, Views,
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
	if !matches!(cfg.index.metric.as_str(), "cosine" | "euclidean") {
		return Err(Error::Validation {
			message: "index.metric must be one of cosine or euclidean.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("completion", &cfg.providers.completion.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	for (label, view) in [
		("views.full", &cfg.views.full),
		("views.geographic", &cfg.views.geographic),
		("views.temporal", &cfg.views.temporal),
		("views.environmental", &cfg.views.environmental),
		("views.socioeconomic", &cfg.views.socioeconomic),
	] {
		let Some(view) = view else { continue };

		if let Some(dimensions) = view.dimensions
			&& dimensions == 0
		{
			return Err(Error::Validation {
				message: format!("{label}.dimensions must be greater than zero."),
			});
		}
		if view.model.as_deref().map(|model| model.trim().is_empty()).unwrap_or(false) {
			return Err(Error::Validation {
				message: format!("{label}.model must be non-empty when set."),
			});
		}
	}

	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.oversample_factor == 0 {
		return Err(Error::Validation {
			message: "retrieval.oversample_factor must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.query_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "retrieval.query_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.top_k == 0 {
		return Err(Error::Validation {
			message: "sync.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.analytics.max_context_records == 0 {
		return Err(Error::Validation {
			message: "analytics.max_context_records must be greater than zero.".to_string(),
		});
	}
	if cfg.analytics.completion_attempts == 0 {
		return Err(Error::Validation {
			message: "analytics.completion_attempts must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for view in [
		&mut cfg.views.full,
		&mut cfg.views.geographic,
		&mut cfg.views.temporal,
		&mut cfg.views.environmental,
		&mut cfg.views.socioeconomic,
	]
	.into_iter()
	.flatten()
	{
		if view.model.as_deref().map(|model| model.trim().is_empty()).unwrap_or(false) {
			view.model = None;
		}
	}
}
