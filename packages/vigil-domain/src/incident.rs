use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use vigil_index::{Metadata, MetadataValue};

/// One incident record as stored by the primary system.
///
/// Enrichment fields (weather, lighting, the socioeconomic block) are often
/// missing for freshly reported incidents, so they stay `Option` and every
/// consumer must handle their absence.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Incident {
	pub id: Uuid,
	pub title: String,
	pub kind: String,
	pub description: String,
	#[serde(with = "crate::time_serde")]
	pub occurred_at: OffsetDateTime,
	pub time_of_day: String,
	pub district: String,
	pub neighborhood: String,
	pub coordinates: Option<(f64, f64)>,
	pub severity: String,
	pub status: String,
	pub weather: Option<String>,
	pub temperature_c: Option<f32>,
	pub lighting: Option<String>,
	pub population_density: Option<f32>,
	pub average_income: Option<f32>,
	pub unemployment_rate: Option<f32>,
	pub notes: Option<String>,
}
impl Incident {
	/// Flat attributes used for index-side equality filtering.
	pub fn metadata(&self) -> Metadata {
		let mut metadata = Metadata::new();

		metadata.insert("kind".to_string(), MetadataValue::Text(self.kind.clone()));
		metadata.insert("district".to_string(), MetadataValue::Text(self.district.clone()));
		metadata
			.insert("neighborhood".to_string(), MetadataValue::Text(self.neighborhood.clone()));
		metadata.insert("severity".to_string(), MetadataValue::Text(self.severity.clone()));
		metadata.insert("status".to_string(), MetadataValue::Text(self.status.clone()));
		metadata.insert(
			"date".to_string(),
			MetadataValue::Text(self.occurred_at.date().to_string()),
		);

		metadata
	}
}
