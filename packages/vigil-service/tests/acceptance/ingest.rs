use std::sync::Arc;

use vigil_domain::{ContextView, ViewWeights};
use vigil_service::{Error, RetrieveRequest};

use super::suite::{
	self, FailByModel, FixedEmbedding, HashEmbedding, StubCompletion,
};

#[tokio::test]
async fn bulk_indexing_populates_every_view() {
	let service = suite::hash_service();
	let incidents = vigil_testkit::incidents(6);
	let report = service.index_incidents(&incidents).await.expect("Failed to index incidents.");

	assert_eq!(report.records, 6);
	assert!(report.fully_indexed());

	for view in ContextView::ALL {
		assert_eq!(service.index(view).len(), 6, "View {view} is missing entries.");
	}
}

#[tokio::test]
async fn indexing_nothing_is_a_no_op() {
	let service = suite::hash_service();
	let report = service.index_incidents(&[]).await.expect("Failed to index empty batch.");

	assert_eq!(report.records, 0);
	assert!(report.fully_indexed());
}

#[tokio::test]
async fn failed_view_leaves_other_views_indexed() {
	let mut cfg = vigil_testkit::test_config();

	suite::config_with_broken_view(&mut cfg, ContextView::Geographic);

	let embedding = Arc::new(FailByModel {
		broken_model: suite::BROKEN_MODEL.to_string(),
		inner: Arc::new(HashEmbedding),
	});
	let service = suite::service(cfg, embedding, Arc::new(StubCompletion::analyst()));
	let incidents = vigil_testkit::incidents(4);
	let report = service.index_incidents(&incidents).await.expect("Failed to index incidents.");

	assert_eq!(report.failures.len(), 1);
	assert_eq!(report.failures[0].view, ContextView::Geographic);
	assert!(matches!(report.failures[0].error, Error::EmbeddingUnavailable(_)));
	assert!(service.index(ContextView::Geographic).is_empty());

	for view in [
		ContextView::Full,
		ContextView::Temporal,
		ContextView::Environmental,
		ContextView::Socioeconomic,
	] {
		assert_eq!(service.index(view).len(), 4, "View {view} is missing entries.");
	}
}

#[tokio::test]
async fn duplicate_ids_in_one_batch_are_rejected_up_front() {
	let service = suite::hash_service();
	let incident = vigil_testkit::incident(0);
	let err = service
		.index_incidents(&[incident.clone(), incident])
		.await
		.expect_err("Expected duplicate batch rejection.");

	assert!(matches!(err, Error::InvalidRequest { .. }));

	for view in ContextView::ALL {
		assert!(service.index(view).is_empty());
	}
}

#[tokio::test]
async fn wrong_dimension_embeddings_leave_indexes_unchanged() {
	// Indexes expect 4 dimensions; this backend returns 3.
	let embedding = Arc::new(FixedEmbedding { vector: vec![0.1, 0.2, 0.3] });
	let service = suite::service(
		vigil_testkit::test_config(),
		embedding,
		Arc::new(StubCompletion::analyst()),
	);
	let report = service
		.index_incidents(&vigil_testkit::incidents(2))
		.await
		.expect("Ingest reports per-view failures instead of failing outright.");

	assert_eq!(report.failures.len(), ContextView::ALL.len());

	for failure in &report.failures {
		assert!(matches!(
			failure.error,
			Error::Index(vigil_index::Error::DimensionMismatch { .. })
		));
	}
	for view in ContextView::ALL {
		assert!(service.index(view).is_empty());
	}
}

#[tokio::test]
async fn removed_incidents_never_come_back_from_retrieval() {
	let service = suite::hash_service();
	let incidents = vigil_testkit::incidents(4);

	service.index_incidents(&incidents).await.expect("Failed to index incidents.");

	let target = incidents[1].id;
	let request = RetrieveRequest {
		query: "theft near the old town".to_string(),
		weights: ViewWeights::balanced(),
		top_k: Some(10),
		filter: None,
		timeout_ms: None,
	};
	let before = service.retrieve(request.clone()).await.expect("Failed to retrieve.");

	assert!(before.iter().any(|result| result.record_id == target));

	let removed = service.remove_incidents(&[target]);

	assert_eq!(removed, ContextView::ALL.len());

	let after = service.retrieve(request).await.expect("Failed to retrieve.");

	assert!(after.iter().all(|result| result.record_id != target));

	// Double delete is a quiet no-op.
	assert_eq!(service.remove_incidents(&[target]), 0);
}
