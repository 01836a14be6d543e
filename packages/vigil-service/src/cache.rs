use std::{
	collections::HashMap,
	sync::{Mutex, MutexGuard, PoisonError},
};

use vigil_domain::ContextView;

/// Key over everything that changes what a query embedding means: provider,
/// model, view, and the query text itself.
pub(crate) fn cache_key(provider_id: &str, model: &str, view: ContextView, text: &str) -> String {
	let mut hasher = blake3::Hasher::new();

	for part in [provider_id, model, view.as_str(), text] {
		hasher.update(&(part.len() as u64).to_le_bytes());
		hasher.update(part.as_bytes());
	}

	hasher.finalize().to_hex().to_string()
}

struct Slot {
	vector: Vec<f32>,
	last_used: u64,
}

struct Inner {
	entries: HashMap<String, Slot>,
	clock: u64,
}

/// Bounded LRU cache for query embeddings. A capacity of zero disables
/// caching entirely.
pub(crate) struct EmbedCache {
	capacity: usize,
	inner: Mutex<Inner>,
}
impl EmbedCache {
	pub fn new(capacity: usize) -> Self {
		Self { capacity, inner: Mutex::new(Inner { entries: HashMap::new(), clock: 0 }) }
	}

	pub fn get(&self, key: &str) -> Option<Vec<f32>> {
		if self.capacity == 0 {
			return None;
		}

		let mut inner = self.lock();

		inner.clock += 1;

		let clock = inner.clock;

		inner.entries.get_mut(key).map(|slot| {
			slot.last_used = clock;

			slot.vector.clone()
		})
	}

	pub fn put(&self, key: String, vector: Vec<f32>) {
		if self.capacity == 0 {
			return;
		}

		let mut inner = self.lock();

		inner.clock += 1;

		let clock = inner.clock;

		inner.entries.insert(key, Slot { vector, last_used: clock });

		while inner.entries.len() > self.capacity {
			let Some(oldest) = inner
				.entries
				.iter()
				.min_by_key(|(_, slot)| slot.last_used)
				.map(|(key, _)| key.clone())
			else {
				break;
			};

			inner.entries.remove(&oldest);
		}
	}

	pub fn len(&self) -> usize {
		self.lock().entries.len()
	}

	fn lock(&self) -> MutexGuard<'_, Inner> {
		self.inner.lock().unwrap_or_else(PoisonError::into_inner)
	}
}
