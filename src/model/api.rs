//! Distance model contract.
//!
//! A model turns a list of items into a validated distance matrix, or
//! refuses with a [`ModelError`].

use std::sync::Arc;

use thiserror::Error;

use crate::item::Item;
use crate::matrix::{DistanceMatrix, InputError};

/// Errors raised while computing distances.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// The model cannot score these items.
    #[error("model '{model}' rejected input: {reason}")]
    Rejected {
        /// Model name.
        model: String,
        /// Why the input was refused.
        reason: String,
    },

    /// The model produced an unusable matrix.
    #[error("model produced an invalid matrix: {0}")]
    InvalidMatrix(#[from] InputError),

    /// No model registered under this name.
    #[error("no distance model named '{0}'")]
    UnknownModel(String),
}

/// Computes an N×N distance matrix for an ordered list of items.
///
/// Row/column `k` of the result must correspond to `items[k]`.
pub trait DistanceModel: Send + Sync + 'static {
    /// Unique model name.
    fn name(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// Score every pair of `items`.
    fn compute_distances(&self, items: &[Arc<Item>]) -> Result<DistanceMatrix, ModelError>;
}
