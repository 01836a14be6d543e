/// Distance metric applied to index vectors. Lower is closer for both
/// variants.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Metric {
	Cosine,
	Euclidean,
}
impl Metric {
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"cosine" => Some(Self::Cosine),
			"euclidean" => Some(Self::Euclidean),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Cosine => "cosine",
			Self::Euclidean => "euclidean",
		}
	}

	pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
		match self {
			Self::Cosine => cosine_distance(a, b),
			Self::Euclidean =>
				a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt(),
		}
	}
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
	let mut dot = 0.;
	let mut norm_a = 0.;
	let mut norm_b = 0.;

	for (x, y) in a.iter().zip(b.iter()) {
		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	// Zero vectors carry no direction; treat them as maximally dissimilar to
	// anything non-zero.
	if norm_a == 0. || norm_b == 0. {
		return 1.;
	}

	(1. - dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0., 2.)
}
