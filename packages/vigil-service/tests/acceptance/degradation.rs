use std::sync::Arc;

use vigil_domain::ContextView;
use vigil_service::{Error, RetrieveRequest};

use super::suite::{self, FailByModel, HashEmbedding, SlowEmbedding, StubCompletion};

#[tokio::test]
async fn broken_view_is_excluded_while_the_rest_serve() {
	let mut cfg = vigil_testkit::test_config();

	suite::config_with_broken_view(&mut cfg, ContextView::Geographic);

	let embedding = Arc::new(FailByModel {
		broken_model: suite::BROKEN_MODEL.to_string(),
		inner: Arc::new(HashEmbedding),
	});
	let service = suite::service(cfg, embedding, Arc::new(StubCompletion::analyst()));

	service
		.index_incidents(&vigil_testkit::incidents(4))
		.await
		.expect("Failed to index incidents.");

	let results = service
		.retrieve(RetrieveRequest::new("assault reported downtown"))
		.await
		.expect("Failed to retrieve.");

	assert!(!results.is_empty());

	for result in &results {
		assert!(!result.per_view_scores.contains_key(&ContextView::Geographic));
	}
}

#[tokio::test]
async fn every_view_failing_is_an_error() {
	// The broken model is the default one, so all five views fail.
	let embedding = Arc::new(FailByModel {
		broken_model: "test-embed".to_string(),
		inner: Arc::new(HashEmbedding),
	});
	let service = suite::service(
		vigil_testkit::test_config(),
		embedding,
		Arc::new(StubCompletion::analyst()),
	);
	let err = service
		.retrieve(RetrieveRequest::new("anything at all"))
		.await
		.expect_err("Expected total failure.");

	assert!(matches!(err, Error::AllViewsFailed));
}

#[tokio::test]
async fn empty_indexes_yield_empty_results_not_an_error() {
	let service = suite::hash_service();
	let results = service
		.retrieve(RetrieveRequest::new("anything at all"))
		.await
		.expect("Empty indexes are not a failure.");

	assert!(results.is_empty());
}

#[tokio::test]
async fn views_missing_the_deadline_count_as_failed() {
	let service = suite::service(
		vigil_testkit::test_config(),
		Arc::new(SlowEmbedding { delay_ms: 200 }),
		Arc::new(StubCompletion::analyst()),
	);
	let mut request = RetrieveRequest::new("anything at all");

	request.timeout_ms = Some(10);

	let err = service.retrieve(request).await.expect_err("Expected timeouts on every view.");

	assert!(matches!(err, Error::AllViewsFailed));
}
