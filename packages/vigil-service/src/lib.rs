//! Multi-context incident retrieval: per-view indexing, weighted score
//! fusion, incident sync, and analyst summarization.

pub mod analytics;
pub mod ingest;
pub mod retrieve;
pub mod sync;

mod cache;
mod error;
mod fusion;

pub use analytics::{Analysis, AnswerItem, AnswerRequest, AnswerResponse, parse_analysis};
pub use error::{Error, Result};
pub use fusion::FusedResult;
pub use ingest::{IngestReport, ViewFailure};
pub use retrieve::RetrieveRequest;
pub use sync::{IncidentSync, ResyncReport, SyncEvent};

use std::{future::Future, pin::Pin, sync::Arc};

use uuid::Uuid;

use vigil_config::{CompletionProviderConfig, Config, EmbeddingProviderConfig};
use vigil_domain::{ContextView, Incident};
use vigil_index::{Metric, ViewIndex};
use vigil_providers::{completion, embedding};

use crate::cache::EmbedCache;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, vigil_providers::Result<Vec<Vec<f32>>>>;
}

pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a CompletionProviderConfig,
		prompt: &'a str,
		attempts: u32,
	) -> BoxFuture<'a, vigil_providers::Result<String>>;
}

/// Seam to the primary incident store. Analytics resolves fused ids through
/// it and the sync adapter rebuilds from it.
pub trait IncidentStore
where
	Self: Send + Sync,
{
	fn fetch<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<Option<Incident>>>;
	fn list<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Incident>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub completion: Arc<dyn CompletionProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		completion: Arc<dyn CompletionProvider>,
	) -> Self {
		Self { embedding, completion }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), completion: provider }
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, vigil_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}
impl CompletionProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a CompletionProviderConfig,
		prompt: &'a str,
		attempts: u32,
	) -> BoxFuture<'a, vigil_providers::Result<String>> {
		Box::pin(completion::complete(cfg, prompt, attempts))
	}
}

/// The retrieval engine. Owns one index per context view plus the query
/// embedding cache; providers are injected trait objects so tests and
/// alternative backends slot in without touching the engine.
pub struct VigilService {
	pub cfg: Config,
	pub providers: Providers,
	view_indexes: [Arc<ViewIndex>; 5],
	cache: Arc<EmbedCache>,
}
impl VigilService {
	pub fn new(cfg: Config) -> Result<Self> {
		Self::with_providers(cfg, Providers::default())
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Result<Self> {
		let metric = Metric::from_name(&cfg.index.metric).ok_or_else(|| Error::InvalidRequest {
			message: format!("Unknown index metric {:?}.", cfg.index.metric),
		})?;
		let view_indexes = ContextView::ALL.map(|view| {
			let embed_cfg = effective_embedding_config(&cfg, view);

			Arc::new(ViewIndex::new(view.as_str(), embed_cfg.dimensions as usize, metric))
		});
		let cache = Arc::new(EmbedCache::new(cfg.retrieval.embed_cache_capacity as usize));

		Ok(Self { cfg, providers, view_indexes, cache })
	}

	pub fn index(&self, view: ContextView) -> &ViewIndex {
		&self.view_indexes[view as usize]
	}

	pub(crate) fn index_arc(&self, view: ContextView) -> Arc<ViewIndex> {
		self.view_indexes[view as usize].clone()
	}

	pub(crate) fn embed_cache(&self) -> Arc<EmbedCache> {
		self.cache.clone()
	}
}

/// The provider defaults with any per-view model or dimension override
/// applied. Views may embed with different models and sizes.
pub(crate) fn effective_embedding_config(
	cfg: &Config,
	view: ContextView,
) -> EmbeddingProviderConfig {
	let mut effective = cfg.providers.embedding.clone();
	let override_ = match view {
		ContextView::Full => &cfg.views.full,
		ContextView::Geographic => &cfg.views.geographic,
		ContextView::Temporal => &cfg.views.temporal,
		ContextView::Environmental => &cfg.views.environmental,
		ContextView::Socioeconomic => &cfg.views.socioeconomic,
	};

	if let Some(override_) = override_ {
		if let Some(model) = &override_.model {
			effective.model = model.clone();
		}
		if let Some(dimensions) = override_.dimensions {
			effective.dimensions = dimensions;
		}
	}

	effective
}

pub(crate) async fn embed_one(
	provider: &Arc<dyn EmbeddingProvider>,
	cfg: &EmbeddingProviderConfig,
	text: &str,
) -> Result<Vec<f32>> {
	let texts = [text.to_string()];
	let mut vectors = provider.embed(cfg, &texts).await.map_err(Error::EmbeddingUnavailable)?;

	vectors.pop().ok_or_else(|| {
		Error::EmbeddingUnavailable(vigil_providers::Error::InvalidResponse {
			message: "Embedding provider returned no vectors.".to_string(),
		})
	})
}
