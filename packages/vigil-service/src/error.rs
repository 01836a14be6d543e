use uuid::Uuid;

use vigil_domain::ContextView;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	/// The embedding backend could not be reached or returned an unusable
	/// response. Retryable.
	#[error("Embedding provider unavailable.")]
	EmbeddingUnavailable(#[source] vigil_providers::Error),
	#[error("Index for view {view} is unavailable.")]
	IndexUnavailable {
		view: ContextView,
		#[source]
		source: vigil_index::Error,
	},
	#[error("View {view} did not respond within {timeout_ms}ms.")]
	ViewTimedOut { view: ContextView, timeout_ms: u64 },
	/// Dimension mismatches and duplicate ids surface through the index
	/// error unchanged; no partial insert has happened when this is returned.
	#[error(transparent)]
	Index(#[from] vigil_index::Error),
	#[error("Incident {id} was not found.")]
	NotFound { id: Uuid },
	#[error("Completion provider failed.")]
	CompletionFailed(#[source] vigil_providers::Error),
	/// Every weighted view failed during retrieval. Distinct from an empty
	/// result set, which is a successful query with no matches.
	#[error("Every context view failed; retrieval produced no ranking.")]
	AllViewsFailed,
	#[error("Store error: {message}")]
	Store { message: String },
}
