use std::sync::Arc;

use uuid::Uuid;

use vigil_config::{Config, EmbeddingProviderConfig, Sync as SyncConfig};
use vigil_domain::{ContextView, Incident, context_text};
use vigil_index::{IndexEntry, MetadataFilter, Metric, ViewIndex};

use crate::{EmbeddingProvider, Error, IncidentStore, Result, effective_embedding_config};

/// A change notification from the primary incident store.
#[derive(Clone, Debug)]
pub enum SyncEvent {
	Created(Incident),
	Updated(Incident),
	Deleted(Uuid),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResyncReport {
	/// Entries discarded before the rebuild.
	pub removed: usize,
	pub indexed: usize,
}

/// Keeps one full-context index consistent with a mutable incident store.
///
/// This is the production "similar incidents" path: create, update, and
/// delete mirror store mutations, `find_similar` serves lookups, and
/// `resync` rebuilds from scratch when the index and store have drifted.
pub struct IncidentSync {
	embed_cfg: EmbeddingProviderConfig,
	sync_cfg: SyncConfig,
	index: Arc<ViewIndex>,
	embedding: Arc<dyn EmbeddingProvider>,
}
impl IncidentSync {
	pub fn new(cfg: &Config, embedding: Arc<dyn EmbeddingProvider>) -> Result<Self> {
		let metric = Metric::from_name(&cfg.index.metric).ok_or_else(|| Error::InvalidRequest {
			message: format!("Unknown index metric {:?}.", cfg.index.metric),
		})?;
		let embed_cfg = effective_embedding_config(cfg, ContextView::Full);
		let index =
			Arc::new(ViewIndex::new("incidents", embed_cfg.dimensions as usize, metric));

		Ok(Self { embed_cfg, sync_cfg: cfg.sync.clone(), index, embedding })
	}

	pub async fn on_create(&self, incident: &Incident) -> Result<()> {
		let entry = self.entry_for(incident).await?;

		self.index.add(vec![entry])?;

		Ok(())
	}

	/// Updates are delete-then-add so stale vectors never linger.
	pub async fn on_update(&self, incident: &Incident) -> Result<()> {
		let entry = self.entry_for(incident).await?;

		self.index.remove(&[incident.id]);
		self.index.add(vec![entry])?;

		Ok(())
	}

	/// Returns whether an entry was actually removed; deleting an unknown id
	/// is a no-op.
	pub fn on_delete(&self, id: Uuid) -> bool {
		self.index.remove(&[id]) == 1
	}

	/// Applies a store event, logging and swallowing failures so one bad
	/// record never stalls the change feed. Returns whether the event took
	/// effect.
	pub async fn apply(&self, event: SyncEvent) -> bool {
		let (id, result) = match &event {
			SyncEvent::Created(incident) => (incident.id, self.on_create(incident).await),
			SyncEvent::Updated(incident) => (incident.id, self.on_update(incident).await),
			SyncEvent::Deleted(id) => (*id, self.on_delete(*id).then_some(()).ok_or(
				Error::NotFound { id: *id },
			)),
		};

		match result {
			Ok(()) => true,
			Err(error) => {
				tracing::warn!(incident = %id, error = %error, "Sync event skipped.");

				false
			},
		}
	}

	/// Nearest incidents to the given record, excluding the record itself.
	pub async fn find_similar(
		&self,
		incident: &Incident,
		top_k: Option<u32>,
		filter: Option<&MetadataFilter>,
	) -> Result<Vec<(Uuid, f32)>> {
		let top_k = match top_k {
			Some(0) =>
				return Err(Error::InvalidRequest {
					message: "top_k must be greater than zero.".to_string(),
				}),
			Some(top_k) => top_k,
			None => self.sync_cfg.top_k,
		} as usize;
		let text = context_text(incident, ContextView::Full);
		let vector = crate::embed_one(&self.embedding, &self.embed_cfg, &text).await?;
		// The record itself is usually indexed and would match first.
		let hits = self
			.index
			.query(&vector, top_k + 1, filter)
			.map_err(|source| Error::IndexUnavailable { view: ContextView::Full, source })?;
		let mut similar = hits
			.into_iter()
			.filter(|(id, _)| *id != incident.id)
			.collect::<Vec<_>>();

		similar.truncate(top_k);

		Ok(similar)
	}

	/// Drops the index and rebuilds it from the store's current contents.
	pub async fn resync(&self, store: &dyn IncidentStore) -> Result<ResyncReport> {
		let incidents = store.list().await?;
		let removed = self.index.len();

		self.index.clear();

		if incidents.is_empty() {
			return Ok(ResyncReport { removed, indexed: 0 });
		}

		let texts = incidents
			.iter()
			.map(|incident| context_text(incident, ContextView::Full))
			.collect::<Vec<_>>();
		let vectors = self
			.embedding
			.embed(&self.embed_cfg, &texts)
			.await
			.map_err(Error::EmbeddingUnavailable)?;
		let entries = incidents
			.iter()
			.zip(vectors)
			.map(|(incident, vector)| IndexEntry {
				record_id: incident.id,
				vector,
				metadata: incident.metadata(),
			})
			.collect::<Vec<_>>();
		let indexed = entries.len();

		self.index.add(entries)?;

		Ok(ResyncReport { removed, indexed })
	}

	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.is_empty()
	}

	pub fn contains(&self, id: &Uuid) -> bool {
		self.index.contains(id)
	}

	async fn entry_for(&self, incident: &Incident) -> Result<IndexEntry> {
		let text = context_text(incident, ContextView::Full);
		let vector = crate::embed_one(&self.embedding, &self.embed_cfg, &text).await?;

		Ok(IndexEntry { record_id: incident.id, vector, metadata: incident.metadata() })
	}
}
