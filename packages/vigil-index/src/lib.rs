//! In-memory per-view vector index.
//!
//! Each context view gets its own [`ViewIndex`] with a fixed dimensionality
//! and distance metric. Entries carry flat metadata for equality filtering.

mod error;
mod metric;
mod view_index;

pub use error::{Error, Result};
pub use metric::Metric;
pub use view_index::{IndexEntry, Metadata, MetadataFilter, MetadataValue, ViewIndex};
