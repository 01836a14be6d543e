//! Shared test fixtures: a ready-made config and deterministic incident
//! records. Provider fakes live with the suites that use them.

use serde_json::Map;
use time::{Duration, macros::datetime};
use uuid::Uuid;

use vigil_config::{
	Analytics, CompletionProviderConfig, Config, EmbeddingProviderConfig, Index, Providers,
	Retrieval, Sync, Views,
};
use vigil_domain::Incident;

pub const TEST_DIMENSIONS: u32 = 4;

/// A valid config pointed at localhost with small limits, suitable for suites
/// that never touch the network.
pub fn test_config() -> Config {
	Config {
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://localhost:0".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test-embed".to_string(),
				dimensions: TEST_DIMENSIONS,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			completion: CompletionProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://localhost:0".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "test-complete".to_string(),
				temperature: 0.1,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		views: Views::default(),
		index: Index::default(),
		retrieval: Retrieval {
			top_k: 5,
			oversample_factor: 5,
			full_rank_limit: 10_000,
			query_timeout_ms: 1_000,
			embed_cache_capacity: 8,
		},
		sync: Sync { top_k: 5 },
		analytics: Analytics { max_context_records: 10, completion_attempts: 2 },
	}
}

const KINDS: [&str; 4] = ["Burglary", "Theft", "Assault", "Vandalism"];
const DISTRICTS: [&str; 3] = ["Harbor", "Center", "North"];
const NEIGHBORHOODS: [&str; 3] = ["Dockside", "Old Town", "Riverside"];
const TIMES_OF_DAY: [&str; 4] = ["morning", "afternoon", "evening", "night"];

/// A deterministic incident; the same `n` always yields the same record.
/// Odd-numbered incidents omit the enrichment fields.
pub fn incident(n: u32) -> Incident {
	let enriched = n % 2 == 0;
	let index = n as usize;

	Incident {
		id: Uuid::from_u128(u128::from(n) + 1),
		title: format!("Incident {n}"),
		kind: KINDS[index % KINDS.len()].to_string(),
		description: format!("Report {n} filed by patrol."),
		occurred_at: datetime!(2025-01-01 12:00 UTC) + Duration::days(i64::from(n)),
		time_of_day: TIMES_OF_DAY[index % TIMES_OF_DAY.len()].to_string(),
		district: DISTRICTS[index % DISTRICTS.len()].to_string(),
		neighborhood: NEIGHBORHOODS[index % NEIGHBORHOODS.len()].to_string(),
		coordinates: Some((52.0 + f64::from(n) * 0.01, 4.3 + f64::from(n) * 0.01)),
		severity: if n % 3 == 0 { "high" } else { "low" }.to_string(),
		status: "open".to_string(),
		weather: enriched.then(|| "clear".to_string()),
		temperature_c: enriched.then_some(12.5),
		lighting: enriched.then(|| "well lit".to_string()),
		population_density: enriched.then_some(4_800.0),
		average_income: enriched.then_some(34_000.0),
		unemployment_rate: enriched.then_some(5.5),
		notes: None,
	}
}

/// `count` incidents starting at ordinal 0.
pub fn incidents(count: u32) -> Vec<Incident> {
	(0..count).map(incident).collect()
}
