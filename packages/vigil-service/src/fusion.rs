use std::{
	cmp::Ordering,
	collections::{BTreeMap, HashMap},
};

use uuid::Uuid;

use vigil_domain::ContextView;

/// One fused ranking entry. `per_view_scores` holds the raw index distance
/// for every responsive view that returned the record.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FusedResult {
	pub record_id: Uuid,
	pub fused_score: f32,
	pub per_view_scores: BTreeMap<ContextView, f32>,
}

/// The raw hits one view contributed, ascending by distance.
pub(crate) struct ViewRanking {
	pub view: ContextView,
	pub weight: f32,
	pub hits: Vec<(Uuid, f32)>,
}

/// Distance-to-score normalization within one result set. The closest hit of
/// a degenerate set (max distance zero) scores 1.0.
pub(crate) fn normalized_score(distance: f32, max_distance: f32) -> f32 {
	if max_distance <= 0. {
		return 1.;
	}

	(1. - distance / max_distance).clamp(0., 1.)
}

/// Weighted union fusion over the responsive views.
///
/// Weights normalize over the views present in `rankings`, so a view that
/// failed upstream redistributes its share instead of dragging every score
/// down. Records absent from a view simply contribute nothing for it.
/// Ordering is fused score descending, then contributing view count
/// descending, then record id ascending.
pub(crate) fn fuse(rankings: &[ViewRanking], top_k: usize) -> Vec<FusedResult> {
	let weight_total: f32 = rankings.iter().map(|ranking| ranking.weight).sum();

	if weight_total <= 0. || top_k == 0 {
		return Vec::new();
	}

	struct Accumulated {
		fused_score: f32,
		per_view_scores: BTreeMap<ContextView, f32>,
	}

	let mut by_record: HashMap<Uuid, Accumulated> = HashMap::new();

	for ranking in rankings {
		let max_distance =
			ranking.hits.iter().map(|(_, distance)| *distance).fold(0., f32::max);

		for (record_id, distance) in &ranking.hits {
			let score = normalized_score(*distance, max_distance);
			let accumulated = by_record.entry(*record_id).or_insert_with(|| Accumulated {
				fused_score: 0.,
				per_view_scores: BTreeMap::new(),
			});

			accumulated.fused_score += score * ranking.weight / weight_total;
			accumulated.per_view_scores.insert(ranking.view, *distance);
		}
	}

	let mut fused = by_record
		.into_iter()
		.map(|(record_id, accumulated)| FusedResult {
			record_id,
			fused_score: accumulated.fused_score,
			per_view_scores: accumulated.per_view_scores,
		})
		.collect::<Vec<_>>();

	fused.sort_by(|left, right| {
		cmp_f32_desc(left.fused_score, right.fused_score)
			.then_with(|| right.per_view_scores.len().cmp(&left.per_view_scores.len()))
			.then_with(|| left.record_id.cmp(&right.record_id))
	});
	fused.truncate(top_k);

	fused
}

fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
