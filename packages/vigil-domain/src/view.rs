use std::fmt;

use time::{OffsetDateTime, macros::format_description};

use crate::incident::Incident;

/// The parallel context views derived from every incident.
#[derive(
	Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ContextView {
	Full,
	Geographic,
	Temporal,
	Environmental,
	Socioeconomic,
}
impl ContextView {
	pub const ALL: [Self; 5] =
		[Self::Full, Self::Geographic, Self::Temporal, Self::Environmental, Self::Socioeconomic];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Full => "full",
			Self::Geographic => "geographic",
			Self::Temporal => "temporal",
			Self::Environmental => "environmental",
			Self::Socioeconomic => "socioeconomic",
		}
	}
}
impl fmt::Display for ContextView {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Renders the text that gets embedded for one view of one incident.
///
/// Total over the view set and deterministic for a given record. Each view
/// reads only its own fields; absent optional fields drop their clause rather
/// than rendering placeholders.
pub fn context_text(incident: &Incident, view: ContextView) -> String {
	match view {
		ContextView::Full => full_text(incident),
		ContextView::Geographic => geographic_text(incident),
		ContextView::Temporal => temporal_text(incident),
		ContextView::Environmental => environmental_text(incident),
		ContextView::Socioeconomic => socioeconomic_text(incident),
	}
}

fn full_text(incident: &Incident) -> String {
	let mut text = format!(
		"Incident: {} in {} on {} during the {} hours.",
		incident.kind,
		incident.neighborhood,
		long_date(incident.occurred_at),
		incident.time_of_day,
	);

	match (&incident.weather, incident.temperature_c) {
		(Some(weather), Some(temperature)) => text.push_str(&format!(
			" The weather was {weather} with a temperature of {temperature:.1}°C."
		)),
		(Some(weather), None) => text.push_str(&format!(" The weather was {weather}.")),
		(None, Some(temperature)) =>
			text.push_str(&format!(" The temperature was {temperature:.1}°C.")),
		(None, None) => (),
	}
	match (&incident.lighting, incident.population_density) {
		(Some(lighting), Some(density)) => text.push_str(&format!(
			" The area was {lighting} with a population density of {density:.1} people per sq km."
		)),
		(Some(lighting), None) => text.push_str(&format!(" The area was {lighting}.")),
		(None, Some(density)) => text.push_str(&format!(
			" The area has a population density of {density:.1} people per sq km."
		)),
		(None, None) => (),
	}
	match (incident.average_income, incident.unemployment_rate) {
		(Some(income), Some(unemployment)) => text.push_str(&format!(
			" The neighborhood has an average income of {income:.1} and an unemployment rate of {unemployment:.1}%."
		)),
		(Some(income), None) =>
			text.push_str(&format!(" The neighborhood has an average income of {income:.1}.")),
		(None, Some(unemployment)) => text.push_str(&format!(
			" The neighborhood has an unemployment rate of {unemployment:.1}%."
		)),
		(None, None) => (),
	}

	if !incident.description.trim().is_empty() {
		text.push(' ');
		text.push_str(incident.description.trim());
	}

	text
}

fn geographic_text(incident: &Incident) -> String {
	match incident.coordinates {
		Some((latitude, longitude)) => format!(
			"Location at coordinates ({latitude}, {longitude}) in {}, {} district",
			incident.neighborhood, incident.district,
		),
		None =>
			format!("Location in {}, {} district", incident.neighborhood, incident.district),
	}
}

fn temporal_text(incident: &Incident) -> String {
	format!(
		"Occurred on {} during {} hours",
		long_date(incident.occurred_at),
		incident.time_of_day,
	)
}

fn environmental_text(incident: &Incident) -> String {
	let mut clauses = Vec::new();

	if let Some(weather) = &incident.weather {
		clauses.push(format!("weather was {weather}"));
	}
	if let Some(temperature) = incident.temperature_c {
		clauses.push(format!("temperature was {temperature:.1}°C"));
	}
	if let Some(lighting) = &incident.lighting {
		clauses.push(format!("lighting was {lighting}"));
	}

	if clauses.is_empty() {
		"No recorded environmental conditions".to_string()
	} else {
		format!("Conditions: {}", clauses.join(" and "))
	}
}

fn socioeconomic_text(incident: &Incident) -> String {
	let mut clauses = Vec::new();

	if let Some(density) = incident.population_density {
		clauses.push(format!("population density of {density:.1} people per sq km"));
	}
	if let Some(income) = incident.average_income {
		clauses.push(format!("average income of {income:.1}"));
	}
	if let Some(unemployment) = incident.unemployment_rate {
		clauses.push(format!("unemployment rate of {unemployment:.1}%"));
	}

	if clauses.is_empty() {
		"No recorded socioeconomic profile".to_string()
	} else {
		format!("Area with {}", clauses.join(" and "))
	}
}

fn long_date(at: OffsetDateTime) -> String {
	let description = format_description!("[weekday repr:long], [month repr:long] [day], [year]");

	at.format(&description).unwrap_or_else(|_| at.date().to_string())
}
