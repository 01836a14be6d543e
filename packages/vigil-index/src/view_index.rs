use std::{
	cmp::Ordering,
	collections::{BTreeMap, HashMap, HashSet},
	sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use uuid::Uuid;

use crate::{
	error::{Error, Result},
	metric::Metric,
};

#[derive(Clone, Debug, PartialEq)]
pub enum MetadataValue {
	Text(String),
	Integer(i64),
	Float(f64),
	Bool(bool),
}

pub type Metadata = BTreeMap<String, MetadataValue>;

/// Equality match over entry metadata. Every condition must hold for an entry
/// to pass; an empty filter passes everything.
#[derive(Clone, Debug, Default)]
pub struct MetadataFilter {
	conditions: BTreeMap<String, MetadataValue>,
}
impl MetadataFilter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
		self.conditions.insert(key.into(), value);

		self
	}

	pub fn is_empty(&self) -> bool {
		self.conditions.is_empty()
	}

	pub fn matches(&self, metadata: &Metadata) -> bool {
		self.conditions.iter().all(|(key, value)| metadata.get(key) == Some(value))
	}
}

#[derive(Clone, Debug)]
pub struct IndexEntry {
	pub record_id: Uuid,
	pub vector: Vec<f32>,
	pub metadata: Metadata,
}
impl IndexEntry {
	pub fn new(record_id: Uuid, vector: Vec<f32>) -> Self {
		Self { record_id, vector, metadata: Metadata::new() }
	}
}

struct Stored {
	entry: IndexEntry,
	sequence: u64,
}

struct Table {
	entries: HashMap<Uuid, Stored>,
	next_sequence: u64,
}

/// In-memory vector index for one context view.
///
/// Reads run in parallel under the read lock; mutations take the write lock
/// and are atomic, so a concurrent query observes either the pre-mutation or
/// the post-mutation table, never a torn one.
pub struct ViewIndex {
	name: String,
	dimensions: usize,
	metric: Metric,
	inner: RwLock<Table>,
}
impl ViewIndex {
	pub fn new(name: impl Into<String>, dimensions: usize, metric: Metric) -> Self {
		Self {
			name: name.into(),
			dimensions,
			metric,
			inner: RwLock::new(Table { entries: HashMap::new(), next_sequence: 0 }),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn dimensions(&self) -> usize {
		self.dimensions
	}

	pub fn metric(&self) -> Metric {
		self.metric
	}

	/// Inserts a batch of entries.
	///
	/// The whole batch is validated before any entry lands: a dimension
	/// mismatch or a duplicate id (against the index or within the batch)
	/// rejects the batch and leaves the index unchanged. An empty batch is a
	/// no-op.
	pub fn add(&self, entries: Vec<IndexEntry>) -> Result<()> {
		if entries.is_empty() {
			return Ok(());
		}

		let mut table = self.write();
		let mut batch_ids = HashSet::with_capacity(entries.len());

		for entry in &entries {
			if entry.vector.len() != self.dimensions {
				return Err(Error::DimensionMismatch {
					index: self.name.clone(),
					record_id: entry.record_id,
					expected: self.dimensions,
					actual: entry.vector.len(),
				});
			}
			if table.entries.contains_key(&entry.record_id) || !batch_ids.insert(entry.record_id) {
				return Err(Error::DuplicateId {
					index: self.name.clone(),
					record_id: entry.record_id,
				});
			}
		}

		for entry in entries {
			let sequence = table.next_sequence;

			table.next_sequence += 1;
			table.entries.insert(entry.record_id, Stored { entry, sequence });
		}

		Ok(())
	}

	/// Removes the given ids, ignoring ones that are not present. Returns the
	/// number of entries actually removed.
	pub fn remove(&self, ids: &[Uuid]) -> usize {
		let mut table = self.write();

		ids.iter().filter(|id| table.entries.remove(id).is_some()).count()
	}

	/// Removes every entry whose metadata matches the filter. Returns the
	/// number of entries removed.
	pub fn remove_matching(&self, filter: &MetadataFilter) -> usize {
		let mut table = self.write();
		let before = table.entries.len();

		table.entries.retain(|_, stored| !filter.matches(&stored.entry.metadata));

		before - table.entries.len()
	}

	/// Returns up to `k` entries by ascending distance to `vector`, optionally
	/// restricted to entries matching `filter`.
	///
	/// Distance ties break by insertion sequence ascending. Fewer than `k`
	/// matches yield a shorter result, never padding.
	pub fn query(
		&self,
		vector: &[f32],
		k: usize,
		filter: Option<&MetadataFilter>,
	) -> Result<Vec<(Uuid, f32)>> {
		if vector.len() != self.dimensions {
			return Err(Error::QueryDimensionMismatch {
				index: self.name.clone(),
				expected: self.dimensions,
				actual: vector.len(),
			});
		}
		if k == 0 {
			return Ok(Vec::new());
		}

		let table = self.read();
		let mut scored = table
			.entries
			.values()
			.filter(|stored| filter.map(|f| f.matches(&stored.entry.metadata)).unwrap_or(true))
			.map(|stored| {
				(self.metric.distance(vector, &stored.entry.vector), stored.sequence, stored.entry.record_id)
			})
			.collect::<Vec<_>>();

		scored.sort_by(|a, b| cmp_f32_asc(a.0, b.0).then_with(|| a.1.cmp(&b.1)));
		scored.truncate(k);

		Ok(scored.into_iter().map(|(distance, _, record_id)| (record_id, distance)).collect())
	}

	pub fn len(&self) -> usize {
		self.read().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.read().entries.is_empty()
	}

	pub fn contains(&self, record_id: &Uuid) -> bool {
		self.read().entries.contains_key(record_id)
	}

	/// All indexed record ids in ascending id order.
	pub fn record_ids(&self) -> Vec<Uuid> {
		let table = self.read();
		let mut ids = table.entries.keys().copied().collect::<Vec<_>>();

		ids.sort();

		ids
	}

	pub fn clear(&self) {
		let mut table = self.write();

		table.entries.clear();
	}

	fn read(&self) -> RwLockReadGuard<'_, Table> {
		self.inner.read().unwrap_or_else(PoisonError::into_inner)
	}

	fn write(&self) -> RwLockWriteGuard<'_, Table> {
		self.inner.write().unwrap_or_else(PoisonError::into_inner)
	}
}

fn cmp_f32_asc(a: f32, b: f32) -> Ordering {
	a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
