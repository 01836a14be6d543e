use std::{
	collections::{BTreeMap, BTreeSet},
	sync::Arc,
	time::Duration,
};

use tokio::{task::JoinSet, time};

use vigil_config::EmbeddingProviderConfig;
use vigil_domain::{ContextView, ViewWeights};
use vigil_index::{MetadataFilter, ViewIndex};

use crate::{
	EmbeddingProvider, Error, Result, VigilService,
	cache::{self, EmbedCache},
	effective_embedding_config,
	fusion::{self, FusedResult, ViewRanking},
};

#[derive(Clone, Debug)]
pub struct RetrieveRequest {
	pub query: String,
	pub weights: ViewWeights,
	/// Overrides `retrieval.top_k` from config when set.
	pub top_k: Option<u32>,
	pub filter: Option<MetadataFilter>,
	/// Per-view deadline override in milliseconds.
	pub timeout_ms: Option<u64>,
}
impl RetrieveRequest {
	pub fn new(query: impl Into<String>) -> Self {
		Self {
			query: query.into(),
			weights: ViewWeights::balanced(),
			top_k: None,
			filter: None,
			timeout_ms: None,
		}
	}
}

struct ViewQuery {
	view: ContextView,
	weight: f32,
	cfg: EmbeddingProviderConfig,
	embedding: Arc<dyn EmbeddingProvider>,
	cache: Arc<EmbedCache>,
	index: Arc<ViewIndex>,
	query: String,
	filter: Option<MetadataFilter>,
	top_k: usize,
	oversample_factor: usize,
	full_rank_limit: usize,
}

impl VigilService {
	/// Weighted multi-view retrieval.
	///
	/// Every positively weighted view embeds the query and queries its index
	/// concurrently under a per-view deadline. Views that fail or time out
	/// are logged and excluded from fusion; only when every view fails does
	/// the call error, so zero matches stays distinguishable from total
	/// outage.
	pub async fn retrieve(&self, request: RetrieveRequest) -> Result<Vec<FusedResult>> {
		if !request.weights.is_valid() {
			return Err(Error::InvalidRequest {
				message: "View weights must be finite and zero or greater.".to_string(),
			});
		}

		let top_k = match request.top_k {
			Some(0) =>
				return Err(Error::InvalidRequest {
					message: "top_k must be greater than zero.".to_string(),
				}),
			Some(top_k) => top_k,
			None => self.cfg.retrieval.top_k,
		} as usize;

		if request.weights.is_inert() {
			return Ok(Vec::new());
		}
		if request.query.trim().is_empty() {
			return Ok(self.blank_query_results(&request.weights, top_k));
		}

		let timeout =
			Duration::from_millis(request.timeout_ms.unwrap_or(self.cfg.retrieval.query_timeout_ms));
		let mut tasks = JoinSet::new();

		for (view, weight) in request.weights.active() {
			let view_query = ViewQuery {
				view,
				weight,
				cfg: effective_embedding_config(&self.cfg, view),
				embedding: self.providers.embedding.clone(),
				cache: self.embed_cache(),
				index: self.index_arc(view),
				query: request.query.clone(),
				filter: request.filter.clone(),
				top_k,
				oversample_factor: self.cfg.retrieval.oversample_factor as usize,
				full_rank_limit: self.cfg.retrieval.full_rank_limit as usize,
			};

			tasks.spawn(async move {
				let outcome = time::timeout(timeout, query_view(view_query)).await;
				let result = match outcome {
					Ok(result) => result,
					Err(_) =>
						Err(Error::ViewTimedOut { view, timeout_ms: timeout.as_millis() as u64 }),
				};

				(view, result)
			});
		}

		let mut rankings = Vec::new();
		let mut failed_views = 0_usize;

		while let Some(joined) = tasks.join_next().await {
			match joined {
				Ok((_, Ok(ranking))) => rankings.push(ranking),
				Ok((view, Err(error))) => {
					failed_views += 1;

					tracing::warn!(view = %view, error = %error, "Excluding view from fusion.");
				},
				Err(error) => {
					failed_views += 1;

					tracing::warn!(error = %error, "View query task failed.");
				},
			}
		}

		if rankings.is_empty() {
			return if failed_views > 0 { Err(Error::AllViewsFailed) } else { Ok(Vec::new()) };
		}

		// Stable fusion input order keeps float accumulation deterministic
		// regardless of task completion order.
		rankings.sort_by_key(|ranking| ranking.view);

		Ok(fusion::fuse(&rankings, top_k))
	}

	/// A blank query enumerates instead of ranking: the union of ids across
	/// the weighted views, ascending, with zero scores.
	fn blank_query_results(&self, weights: &ViewWeights, top_k: usize) -> Vec<FusedResult> {
		let mut ids = BTreeSet::new();

		for (view, _) in weights.active() {
			ids.extend(self.index(view).record_ids());
		}

		ids.into_iter()
			.take(top_k)
			.map(|record_id| FusedResult {
				record_id,
				fused_score: 0.,
				per_view_scores: BTreeMap::new(),
			})
			.collect()
	}
}

async fn query_view(args: ViewQuery) -> Result<ViewRanking> {
	let ViewQuery {
		view,
		weight,
		cfg,
		embedding,
		cache,
		index,
		query,
		filter,
		top_k,
		oversample_factor,
		full_rank_limit,
	} = args;
	let key = cache::cache_key(&cfg.provider_id, &cfg.model, view, &query);
	let vector = match cache.get(&key) {
		Some(vector) => vector,
		None => {
			let vector = crate::embed_one(&embedding, &cfg, &query).await?;

			cache.put(key, vector.clone());

			vector
		},
	};
	let indexed = index.len();
	let candidate_k = if indexed <= full_rank_limit {
		top_k.max(indexed)
	} else {
		oversample_factor.saturating_mul(top_k)
	};
	let hits = index
		.query(&vector, candidate_k, filter.as_ref())
		.map_err(|source| Error::IndexUnavailable { view, source })?;

	Ok(ViewRanking { view, weight, hits })
}
