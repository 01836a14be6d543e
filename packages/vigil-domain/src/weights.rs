use serde::{Deserialize, Serialize};

use crate::view::ContextView;

/// Per-view weighting applied during score fusion. Weights are relative; the
/// retriever normalizes over whichever views actually respond.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct ViewWeights {
	pub full: f32,
	pub geographic: f32,
	pub temporal: f32,
	pub environmental: f32,
	pub socioeconomic: f32,
}
impl ViewWeights {
	/// Default profile leaning on the full description while keeping every
	/// specialized view in play.
	pub fn balanced() -> Self {
		Self { full: 0.3, geographic: 0.2, temporal: 0.2, environmental: 0.15, socioeconomic: 0.15 }
	}

	/// Profile concentrating on one view, with the full description as the
	/// secondary signal.
	pub fn focused(view: ContextView) -> Self {
		match view {
			ContextView::Full => Self {
				full: 0.6,
				geographic: 0.2,
				temporal: 0.1,
				environmental: 0.05,
				socioeconomic: 0.05,
			},
			ContextView::Geographic => Self {
				full: 0.2,
				geographic: 0.6,
				temporal: 0.1,
				environmental: 0.05,
				socioeconomic: 0.05,
			},
			ContextView::Temporal => Self {
				full: 0.2,
				geographic: 0.1,
				temporal: 0.6,
				environmental: 0.05,
				socioeconomic: 0.05,
			},
			ContextView::Environmental => Self {
				full: 0.2,
				geographic: 0.1,
				temporal: 0.05,
				environmental: 0.6,
				socioeconomic: 0.05,
			},
			ContextView::Socioeconomic => Self {
				full: 0.2,
				geographic: 0.1,
				temporal: 0.05,
				environmental: 0.05,
				socioeconomic: 0.6,
			},
		}
	}

	pub fn only(view: ContextView) -> Self {
		let mut weights =
			Self { full: 0., geographic: 0., temporal: 0., environmental: 0., socioeconomic: 0. };

		*weights.get_mut(view) = 1.;

		weights
	}

	pub fn get(&self, view: ContextView) -> f32 {
		match view {
			ContextView::Full => self.full,
			ContextView::Geographic => self.geographic,
			ContextView::Temporal => self.temporal,
			ContextView::Environmental => self.environmental,
			ContextView::Socioeconomic => self.socioeconomic,
		}
	}

	pub fn get_mut(&mut self, view: ContextView) -> &mut f32 {
		match view {
			ContextView::Full => &mut self.full,
			ContextView::Geographic => &mut self.geographic,
			ContextView::Temporal => &mut self.temporal,
			ContextView::Environmental => &mut self.environmental,
			ContextView::Socioeconomic => &mut self.socioeconomic,
		}
	}

	/// True when every weight is finite and zero or greater.
	pub fn is_valid(&self) -> bool {
		ContextView::ALL.iter().all(|view| {
			let weight = self.get(*view);

			weight.is_finite() && weight >= 0.
		})
	}

	/// True when no view carries a positive weight; fusion over an inert
	/// profile has nothing to rank.
	pub fn is_inert(&self) -> bool {
		ContextView::ALL.iter().all(|view| self.get(*view) <= 0.)
	}

	/// Views with a positive weight, in canonical view order.
	pub fn active(&self) -> Vec<(ContextView, f32)> {
		ContextView::ALL
			.iter()
			.filter_map(|view| {
				let weight = self.get(*view);

				(weight > 0.).then_some((*view, weight))
			})
			.collect()
	}
}
impl Default for ViewWeights {
	fn default() -> Self {
		Self::balanced()
	}
}
