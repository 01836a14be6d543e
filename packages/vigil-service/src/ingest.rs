use std::collections::HashSet;

use uuid::Uuid;

use vigil_domain::{ContextView, Incident, context_text};
use vigil_index::IndexEntry;

use crate::{Error, Result, VigilService, effective_embedding_config};

#[derive(Debug)]
pub struct ViewFailure {
	pub view: ContextView,
	pub error: Error,
}

/// Outcome of a bulk indexing call. Indexing is not atomic across views: a
/// failed view is reported here while the others keep their entries.
#[derive(Debug)]
pub struct IngestReport {
	pub records: usize,
	pub failures: Vec<ViewFailure>,
}
impl IngestReport {
	pub fn fully_indexed(&self) -> bool {
		self.failures.is_empty()
	}
}

impl VigilService {
	/// Embeds and indexes every view of every incident.
	pub async fn index_incidents(&self, incidents: &[Incident]) -> Result<IngestReport> {
		if incidents.is_empty() {
			return Ok(IngestReport { records: 0, failures: Vec::new() });
		}

		let mut seen = HashSet::with_capacity(incidents.len());

		for incident in incidents {
			if !seen.insert(incident.id) {
				return Err(Error::InvalidRequest {
					message: format!("Duplicate incident id {} in batch.", incident.id),
				});
			}
		}

		let mut failures = Vec::new();

		for view in ContextView::ALL {
			if let Err(error) = self.index_view(view, incidents).await {
				tracing::warn!(
					view = %view,
					error = %error,
					"View indexing failed; other views are unaffected."
				);
				failures.push(ViewFailure { view, error });
			}
		}

		Ok(IngestReport { records: incidents.len(), failures })
	}

	async fn index_view(&self, view: ContextView, incidents: &[Incident]) -> Result<()> {
		let cfg = effective_embedding_config(&self.cfg, view);
		let texts =
			incidents.iter().map(|incident| context_text(incident, view)).collect::<Vec<_>>();
		let vectors = self
			.providers
			.embedding
			.embed(&cfg, &texts)
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
			.collect();

		self.index(view).add(entries)?;

		Ok(())
	}

	/// Removes the incidents from every view index. Ids that were never
	/// indexed are ignored. Returns the total number of entries removed
	/// across all views.
	pub fn remove_incidents(&self, ids: &[Uuid]) -> usize {
		ContextView::ALL.iter().map(|view| self.index(*view).remove(ids)).sum()
	}
}
