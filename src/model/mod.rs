//! Distance models: pluggable producers of the pairwise matrix the
//! clustering engine consumes.

mod api;
mod examples;
mod registry;

pub use api::{DistanceModel, ModelError};
pub use examples::PercentIdentity;
pub use registry::{ModelInfo, ModelRegistry};
