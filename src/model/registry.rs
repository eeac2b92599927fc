//! Name-keyed registry of distance models.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::model::{DistanceModel, ModelError, PercentIdentity};

/// Metadata describing a registered model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Registered name.
    pub name: String,
    /// Description supplied by the model.
    pub description: String,
}

/// Registry of available distance models, keyed by name.
#[derive(Default, Clone)]
pub struct ModelRegistry {
    entries: HashMap<String, Arc<dyn DistanceModel>>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry preloaded with the models shipped in this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(PercentIdentity);
        registry
    }

    /// Register a model and return a shared handle to it. A model with the
    /// same name is replaced.
    pub fn register<M>(&mut self, model: M) -> Arc<M>
    where
        M: DistanceModel,
    {
        let arc = Arc::new(model);
        let shared: Arc<dyn DistanceModel> = arc.clone();
        self.entries.insert(arc.name().to_string(), shared);
        arc
    }

    /// Retrieve a model by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn DistanceModel>> {
        self.entries.get(name).cloned()
    }

    /// Retrieve a model by name or fail with [`ModelError::UnknownModel`].
    pub fn require(&self, name: &str) -> Result<Arc<dyn DistanceModel>, ModelError> {
        self.get(name)
            .ok_or_else(|| ModelError::UnknownModel(name.to_string()))
    }

    /// List all registered models, sorted by name.
    pub fn list(&self) -> Vec<ModelInfo> {
        let mut infos: Vec<ModelInfo> = self
            .entries
            .iter()
            .map(|(name, model)| ModelInfo {
                name: name.clone(),
                description: model.description().to_string(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ModelRegistry").field("models", &names).finish()
    }
}
