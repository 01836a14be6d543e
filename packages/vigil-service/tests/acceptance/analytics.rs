use std::sync::Arc;

use vigil_service::AnswerRequest;

use super::suite::{self, FailingCompletion, HashEmbedding, MemoryStore, StubCompletion};

#[tokio::test]
async fn answer_pairs_retrieved_records_with_an_analysis() {
	let service = suite::hash_service();
	let incidents = vigil_testkit::incidents(3);

	service.index_incidents(&incidents).await.expect("Failed to index incidents.");

	let store = MemoryStore::with(incidents.clone());
	let response = service
		.answer(&store, AnswerRequest::new("what is likely to happen near the harbor tonight"))
		.await
		.expect("Failed to answer.");

	assert!(!response.items.is_empty());

	for item in &response.items {
		assert!(incidents.iter().any(|incident| incident.id == item.incident.id));
	}

	let analysis = response.analysis.expect("Expected a parsed analysis.");

	assert_eq!(analysis.probability.as_deref(), Some("70%"));
	assert_eq!(analysis.risk_level.as_deref(), Some("High"));
	assert_eq!(analysis.raw, suite::ANALYST_REPLY);
}

#[tokio::test]
async fn completion_outage_still_returns_the_records() {
	let service = suite::service(
		vigil_testkit::test_config(),
		Arc::new(HashEmbedding),
		Arc::new(FailingCompletion),
	);
	let incidents = vigil_testkit::incidents(3);

	service.index_incidents(&incidents).await.expect("Failed to index incidents.");

	let store = MemoryStore::with(incidents);
	let response = service
		.answer(&store, AnswerRequest::new("thefts around the old town"))
		.await
		.expect("A completion outage must not fail the whole answer.");

	assert!(!response.items.is_empty());
	assert!(response.analysis.is_none());
}

#[tokio::test]
async fn records_missing_from_the_store_are_skipped() {
	let service = suite::hash_service();
	let incidents = vigil_testkit::incidents(3);

	service.index_incidents(&incidents).await.expect("Failed to index incidents.");

	let store = MemoryStore::with(incidents.clone());

	store.remove(&incidents[1].id);

	let response = service
		.answer(&store, AnswerRequest::new("burglaries this week"))
		.await
		.expect("Failed to answer.");

	assert_eq!(response.items.len(), 2);
	assert!(response.items.iter().all(|item| item.incident.id != incidents[1].id));
}

#[tokio::test]
async fn context_records_are_capped_by_config() {
	let mut cfg = vigil_testkit::test_config();

	cfg.analytics.max_context_records = 2;

	let service = suite::service(
		cfg,
		Arc::new(HashEmbedding),
		Arc::new(StubCompletion::analyst()),
	);
	let incidents = vigil_testkit::incidents(5);

	service.index_incidents(&incidents).await.expect("Failed to index incidents.");

	let store = MemoryStore::with(incidents);
	let mut request = AnswerRequest::new("every open case");

	request.top_k = Some(5);

	let response = service.answer(&store, request).await.expect("Failed to answer.");

	assert_eq!(response.items.len(), 2);
}
