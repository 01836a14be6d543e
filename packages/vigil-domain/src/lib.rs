//! Incident records, the derived context views, and fusion weight profiles.

mod incident;
pub mod time_serde;
mod view;
mod weights;

pub use incident::Incident;
pub use view::{ContextView, context_text};
pub use weights::ViewWeights;
