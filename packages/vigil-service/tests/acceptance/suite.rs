use std::{
	collections::HashMap,
	hash::{DefaultHasher, Hash, Hasher},
	sync::{
		Arc, Mutex, PoisonError,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use tokio::time;
use uuid::Uuid;

use vigil_config::{CompletionProviderConfig, Config, EmbeddingProviderConfig, ViewOverride};
use vigil_domain::Incident;
use vigil_service::{
	BoxFuture, CompletionProvider, EmbeddingProvider, IncidentStore, Providers, Result,
	VigilService,
};

pub const BROKEN_MODEL: &str = "broken-model";

pub const ANALYST_REPLY: &str = "\
1. INCIDENT PROBABILITY: 70%
2. MOST LIKELY INCIDENT TYPE: Theft (55%), Burglary (30%)
3. KEY FACTORS: night hours, repeat locations
4. RISK LEVEL: High";

pub fn service(
	cfg: Config,
	embedding: Arc<dyn EmbeddingProvider>,
	completion: Arc<dyn CompletionProvider>,
) -> VigilService {
	VigilService::with_providers(cfg, Providers::new(embedding, completion))
		.expect("Failed to build service.")
}

/// Service with deterministic text-hash embeddings and a canned analyst.
pub fn hash_service() -> VigilService {
	service(
		vigil_testkit::test_config(),
		Arc::new(HashEmbedding),
		Arc::new(StubCompletion::analyst()),
	)
}

/// Config whose given view embeds with [`BROKEN_MODEL`], for pairing with
/// [`FailByModel`].
pub fn config_with_broken_view(
	cfg: &mut Config,
	view: vigil_domain::ContextView,
) {
	let override_ = ViewOverride { model: Some(BROKEN_MODEL.to_string()), dimensions: None };

	match view {
		vigil_domain::ContextView::Full => cfg.views.full = Some(override_),
		vigil_domain::ContextView::Geographic => cfg.views.geographic = Some(override_),
		vigil_domain::ContextView::Temporal => cfg.views.temporal = Some(override_),
		vigil_domain::ContextView::Environmental => cfg.views.environmental = Some(override_),
		vigil_domain::ContextView::Socioeconomic => cfg.views.socioeconomic = Some(override_),
	}
}

pub fn hash_vector(text: &str, dimensions: usize) -> Vec<f32> {
	(0..dimensions)
		.map(|position| {
			let mut hasher = DefaultHasher::new();

			(text, position).hash(&mut hasher);

			(hasher.finish() % 1_000) as f32 / 1_000. + 0.001
		})
		.collect()
}

/// Deterministic embedding: the same text always maps to the same vector.
pub struct HashEmbedding;
impl EmbeddingProvider for HashEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, vigil_providers::Result<Vec<Vec<f32>>>> {
		let dimensions = cfg.dimensions as usize;
		let vectors = texts.iter().map(|text| hash_vector(text, dimensions)).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

/// Returns the same vector for every text, whatever its length.
pub struct FixedEmbedding {
	pub vector: Vec<f32>,
}
impl EmbeddingProvider for FixedEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, vigil_providers::Result<Vec<Vec<f32>>>> {
		let vectors = texts.iter().map(|_| self.vector.clone()).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

/// Fails whenever the effective model matches, delegating otherwise. Lets a
/// single view break while the rest keep working.
pub struct FailByModel {
	pub broken_model: String,
	pub inner: Arc<dyn EmbeddingProvider>,
}
impl EmbeddingProvider for FailByModel {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, vigil_providers::Result<Vec<Vec<f32>>>> {
		if cfg.model == self.broken_model {
			return Box::pin(async {
				Err(vigil_providers::Error::InvalidResponse {
					message: "Embedding backend rejected the model.".to_string(),
				})
			});
		}

		self.inner.embed(cfg, texts)
	}
}

pub struct SpyEmbedding {
	pub inner: Arc<dyn EmbeddingProvider>,
	pub calls: Arc<AtomicUsize>,
}
impl EmbeddingProvider for SpyEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, vigil_providers::Result<Vec<Vec<f32>>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		self.inner.embed(cfg, texts)
	}
}

pub struct SlowEmbedding {
	pub delay_ms: u64,
}
impl EmbeddingProvider for SlowEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, vigil_providers::Result<Vec<Vec<f32>>>> {
		let dimensions = cfg.dimensions as usize;
		let vectors: Vec<Vec<f32>> =
			texts.iter().map(|text| hash_vector(text, dimensions)).collect();
		let delay = Duration::from_millis(self.delay_ms);

		Box::pin(async move {
			time::sleep(delay).await;

			Ok(vectors)
		})
	}
}

pub struct StubCompletion {
	pub reply: String,
}
impl StubCompletion {
	pub fn analyst() -> Self {
		Self { reply: ANALYST_REPLY.to_string() }
	}
}
impl CompletionProvider for StubCompletion {
	fn complete<'a>(
		&'a self,
		_cfg: &'a CompletionProviderConfig,
		_prompt: &'a str,
		_attempts: u32,
	) -> BoxFuture<'a, vigil_providers::Result<String>> {
		let reply = self.reply.clone();

		Box::pin(async move { Ok(reply) })
	}
}

pub struct FailingCompletion;
impl CompletionProvider for FailingCompletion {
	fn complete<'a>(
		&'a self,
		_cfg: &'a CompletionProviderConfig,
		_prompt: &'a str,
		_attempts: u32,
	) -> BoxFuture<'a, vigil_providers::Result<String>> {
		Box::pin(async {
			Err(vigil_providers::Error::InvalidResponse {
				message: "Completion backend is down.".to_string(),
			})
		})
	}
}

/// In-memory incident store backing the store seam in tests.
#[derive(Default)]
pub struct MemoryStore {
	incidents: Mutex<HashMap<Uuid, Incident>>,
}
impl MemoryStore {
	pub fn with(incidents: Vec<Incident>) -> Self {
		let store = Self::default();

		for incident in incidents {
			store.insert(incident);
		}

		store
	}

	pub fn insert(&self, incident: Incident) {
		self.lock().insert(incident.id, incident);
	}

	pub fn remove(&self, id: &Uuid) {
		self.lock().remove(id);
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Incident>> {
		self.incidents.lock().unwrap_or_else(PoisonError::into_inner)
	}
}
impl IncidentStore for MemoryStore {
	fn fetch<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<Option<Incident>>> {
		let incident = self.lock().get(&id).cloned();

		Box::pin(async move { Ok(incident) })
	}

	fn list<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Incident>>> {
		let mut incidents = self.lock().values().cloned().collect::<Vec<_>>();

		incidents.sort_by_key(|incident| incident.id);

		Box::pin(async move { Ok(incidents) })
	}
}
