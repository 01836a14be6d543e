use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub providers: Providers,
	#[serde(default)]
	pub views: Views,
	#[serde(default)]
	pub index: Index,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub sync: Sync,
	#[serde(default)]
	pub analytics: Analytics,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub completion: CompletionProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Per-view overrides on top of the default embedding provider. Views left
/// unset inherit the provider's model and dimensions.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Views {
	pub full: Option<ViewOverride>,
	pub geographic: Option<ViewOverride>,
	pub temporal: Option<ViewOverride>,
	pub environmental: Option<ViewOverride>,
	pub socioeconomic: Option<ViewOverride>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ViewOverride {
	pub model: Option<String>,
	pub dimensions: Option<u32>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Index {
	pub metric: String,
}
impl Default for Index {
	fn default() -> Self {
		Self { metric: "cosine".to_string() }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub top_k: u32,
	/// Candidate oversampling per view when the index is too large to rank
	/// fully: candidate_k = oversample_factor * top_k.
	pub oversample_factor: u32,
	/// Indexes at or below this entry count are ranked in full.
	pub full_rank_limit: u32,
	pub query_timeout_ms: u64,
	/// Query-embedding cache capacity. Zero disables caching.
	pub embed_cache_capacity: u32,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			top_k: 5,
			oversample_factor: 5,
			full_rank_limit: 10_000,
			query_timeout_ms: 10_000,
			embed_cache_capacity: 128,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Sync {
	pub top_k: u32,
}
impl Default for Sync {
	fn default() -> Self {
		Self { top_k: 5 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Analytics {
	pub max_context_records: u32,
	pub completion_attempts: u32,
}
impl Default for Analytics {
	fn default() -> Self {
		Self { max_context_records: 20, completion_attempts: 3 }
	}
}
