use std::collections::BTreeMap;

use vigil_domain::{ContextView, Incident, ViewWeights};
use vigil_index::MetadataFilter;

use crate::{Error, IncidentStore, Result, RetrieveRequest, VigilService};

#[derive(Clone, Debug)]
pub struct AnswerRequest {
	pub query: String,
	pub weights: ViewWeights,
	pub top_k: Option<u32>,
	pub filter: Option<MetadataFilter>,
}
impl AnswerRequest {
	pub fn new(query: impl Into<String>) -> Self {
		Self { query: query.into(), weights: ViewWeights::balanced(), top_k: None, filter: None }
	}
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct AnswerItem {
	pub incident: Incident,
	pub fused_score: f32,
	pub per_view_scores: BTreeMap<ContextView, f32>,
}

/// Retrieval output plus the analyst summary. `analysis` is `None` when the
/// completion backend failed; the retrieved items still stand on their own.
#[derive(Clone, Debug, serde::Serialize)]
pub struct AnswerResponse {
	pub items: Vec<AnswerItem>,
	pub analysis: Option<Analysis>,
}

/// The structured sections of an analyst reply. Sections the model skipped
/// or mangled stay `None`; `raw` always carries the full reply.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct Analysis {
	pub raw: String,
	pub probability: Option<String>,
	pub likely_kind: Option<String>,
	pub key_factors: Option<String>,
	pub risk_level: Option<String>,
}

impl VigilService {
	/// Full analytic query: retrieve, resolve records through the store, then
	/// summarize. A completion failure downgrades to a partial response with
	/// the retrieved items and no analysis.
	pub async fn answer(
		&self,
		store: &dyn IncidentStore,
		request: AnswerRequest,
	) -> Result<AnswerResponse> {
		let results = self
			.retrieve(RetrieveRequest {
				query: request.query.clone(),
				weights: request.weights,
				top_k: request.top_k,
				filter: request.filter.clone(),
				timeout_ms: None,
			})
			.await?;
		let max_records = self.cfg.analytics.max_context_records as usize;
		let mut items = Vec::new();

		for result in results {
			if items.len() == max_records {
				break;
			}

			match store.fetch(result.record_id).await? {
				Some(incident) => items.push(AnswerItem {
					incident,
					fused_score: result.fused_score,
					per_view_scores: result.per_view_scores,
				}),
				// Index and store can drift between sync cycles.
				None => tracing::warn!(
					record_id = %result.record_id,
					"Indexed record is missing from the store; skipping."
				),
			}
		}

		let analysis = match self.summarize(&request.query, &items).await {
			Ok(analysis) => Some(analysis),
			Err(error) => {
				tracing::warn!(
					error = %error,
					"Completion failed; returning retrieved items without analysis."
				);

				None
			},
		};

		Ok(AnswerResponse { items, analysis })
	}

	pub async fn summarize(&self, query: &str, items: &[AnswerItem]) -> Result<Analysis> {
		let prompt = analyst_prompt(query, items);
		let reply = self
			.providers
			.completion
			.complete(
				&self.cfg.providers.completion,
				&prompt,
				self.cfg.analytics.completion_attempts,
			)
			.await
			.map_err(Error::CompletionFailed)?;

		Ok(parse_analysis(&reply))
	}
}

fn analyst_prompt(query: &str, items: &[AnswerItem]) -> String {
	let context = if items.is_empty() {
		"No matching incident records were retrieved.".to_string()
	} else {
		items
			.iter()
			.enumerate()
			.map(|(ordinal, item)| record_block(ordinal + 1, &item.incident))
			.collect::<Vec<_>>()
			.join("\n\n")
	};

	format!(
		"You are an incident analysis assistant. Analyze the likelihood of further incidents \
		based on the provided data.\n\
		\n\
		CONTEXT DATA:\n\
		{context}\n\
		\n\
		QUERY DETAILS:\n\
		{query}\n\
		\n\
		Provide a concise probability analysis with this exact format:\n\
		\n\
		1. INCIDENT PROBABILITY: [percentage estimate for an incident occurring]\n\
		2. MOST LIKELY INCIDENT TYPE: [the most likely incident type, with percentages]\n\
		3. KEY FACTORS: [two or three main risk factors]\n\
		4. RISK LEVEL: [Low/Moderate/High/Very High]\n\
		\n\
		Base the analysis strictly on the patterns in the provided records. Keep the complete \
		response under 10 lines."
	)
}

fn record_block(ordinal: usize, incident: &Incident) -> String {
	let mut block = format!("Record {ordinal}:\nType: {}\n", incident.kind);

	match incident.coordinates {
		Some((latitude, longitude)) => block.push_str(&format!(
			"Location: {}, {} district at coordinates ({latitude}, {longitude})\n",
			incident.neighborhood, incident.district,
		)),
		None => block.push_str(&format!(
			"Location: {}, {} district\n",
			incident.neighborhood, incident.district,
		)),
	}

	block.push_str(&format!(
		"Date and time: {}, {}\n",
		incident.occurred_at.date(),
		incident.time_of_day,
	));

	let mut conditions = Vec::new();

	if let Some(weather) = &incident.weather {
		conditions.push(format!("Weather: {weather}"));
	}
	if let Some(temperature) = incident.temperature_c {
		conditions.push(format!("Temperature: {temperature:.1}°C"));
	}
	if let Some(lighting) = &incident.lighting {
		conditions.push(format!("Lighting: {lighting}"));
	}
	if !conditions.is_empty() {
		block.push_str(&conditions.join(", "));
		block.push('\n');
	}

	let mut profile = Vec::new();

	if let Some(density) = incident.population_density {
		profile.push(format!("Population density: {density:.1}"));
	}
	if let Some(income) = incident.average_income {
		profile.push(format!("Average income: {income:.1}"));
	}
	if let Some(unemployment) = incident.unemployment_rate {
		profile.push(format!("Unemployment rate: {unemployment:.1}%"));
	}
	if !profile.is_empty() {
		block.push_str(&profile.join(", "));
		block.push('\n');
	}

	block.push_str(&format!("Severity: {}, status: {}", incident.severity, incident.status));

	block
}

/// Recovers the labeled sections from an analyst reply. Tolerates missing
/// sections, leading numbering, and extra prose.
pub fn parse_analysis(raw: &str) -> Analysis {
	let mut analysis = Analysis { raw: raw.to_string(), ..Default::default() };

	for line in raw.lines() {
		if let Some(value) = labeled_value(line, "INCIDENT PROBABILITY:") {
			analysis.probability = Some(value);
		} else if let Some(value) = labeled_value(line, "MOST LIKELY INCIDENT TYPE:") {
			analysis.likely_kind = Some(value);
		} else if let Some(value) = labeled_value(line, "KEY FACTORS:") {
			analysis.key_factors = Some(value);
		} else if let Some(value) = labeled_value(line, "RISK LEVEL:") {
			analysis.risk_level = Some(value);
		}
	}

	analysis
}

fn labeled_value(line: &str, label: &str) -> Option<String> {
	let start = line.find(label)?;
	let value = line[start + label.len()..].trim();

	(!value.is_empty()).then(|| value.to_string())
}
