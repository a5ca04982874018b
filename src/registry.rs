//! Process-wide model registry.
//!
//! Maps a [`ModelId`] to a loaded [`Scorer`], populated once at startup from
//! externally supplied fitted parameters and immutable during normal
//! operation. Hot-reload, when used, replaces a whole entry atomically:
//! readers clone the `Arc`, so in-flight scoring observes either the old or
//! the new scorer in full, never a partially updated one.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::domain::ModelId;
use crate::error::RequestError;
use crate::io::params::read_params_json;
use crate::models::Scorer;

/// Environment variable naming the directory of `<family>.json` files.
pub const MODEL_DIR_ENV: &str = "PROPENSITY_MODEL_DIR";

pub struct ModelRegistry {
    scorers: RwLock<HashMap<ModelId, Arc<dyn Scorer>>>,
}

impl ModelRegistry {
    /// An empty registry. Every `get` fails with `UnknownModel` until models
    /// are loaded.
    pub fn new() -> Self {
        Self {
            scorers: RwLock::new(HashMap::new()),
        }
    }

    /// Load (or atomically replace) the entry for the scorer's family.
    pub fn load(&self, scorer: Arc<dyn Scorer>) {
        let mut map = self
            .scorers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        map.insert(scorer.model_id(), scorer);
    }

    /// Fetch the scorer serving `model`.
    ///
    /// The returned `Arc` stays valid across hot-swaps.
    pub fn get(&self, model: ModelId) -> Result<Arc<dyn Scorer>, RequestError> {
        let map = self
            .scorers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        map.get(&model)
            .cloned()
            .ok_or_else(|| RequestError::UnknownModel(model.display_name().to_string()))
    }

    /// Model ids currently loaded, in registry-declaration order.
    pub fn loaded(&self) -> Vec<ModelId> {
        let map = self
            .scorers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        ModelId::ALL
            .into_iter()
            .filter(|id| map.contains_key(id))
            .collect()
    }

    /// Load every `<family>.json` present in `dir`.
    ///
    /// Missing files are fine (a deployment may serve a subset of families);
    /// an unreadable or invalid file is a config error. Fails if no file at
    /// all was found.
    pub fn from_dir(dir: &Path) -> Result<Self, RequestError> {
        let registry = Self::new();
        let mut loaded = 0usize;

        for id in ModelId::ALL {
            let path = dir.join(format!("{}.json", id.file_stem()));
            if !path.exists() {
                continue;
            }
            let params = read_params_json(&path)?;
            if params.model_id() != id {
                return Err(RequestError::Config(format!(
                    "Parameter file '{}' declares family '{}' but is named for '{}'.",
                    path.display(),
                    params.model_id(),
                    id
                )));
            }
            registry.load(Arc::from(params.into_scorer()?));
            loaded += 1;
        }

        if loaded == 0 {
            return Err(RequestError::Config(format!(
                "No fitted-parameter files found in '{}'.",
                dir.display()
            )));
        }
        Ok(registry)
    }

    /// Resolve the model directory from the environment (`.env` supported)
    /// and load it.
    pub fn from_env() -> Result<Self, RequestError> {
        dotenvy::dotenv().ok();
        let dir = std::env::var(MODEL_DIR_ENV).map_err(|_| {
            RequestError::Config(format!("Missing {MODEL_DIR_ENV} in environment (.env)."))
        })?;
        Self::from_dir(Path::new(&dir))
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerHistory, FeatureRecord};
    use crate::models::{LinearParams, LinearScorer};

    fn linear(weight: f64) -> Arc<dyn Scorer> {
        Arc::new(
            LinearScorer::new(LinearParams {
                weights: vec![weight],
                intercept: 0.0,
            })
            .unwrap(),
        )
    }

    fn one_record() -> CustomerHistory {
        CustomerHistory::from_record(FeatureRecord {
            customer_id: "C".to_string(),
            features: vec![1.0],
            snapshot_date: None,
        })
    }

    #[test]
    fn unloaded_model_is_unknown() {
        let registry = ModelRegistry::new();
        let err = registry.get(ModelId::Linear).unwrap_err();
        assert_eq!(
            err,
            RequestError::UnknownModel("linear".to_string())
        );
    }

    #[test]
    fn load_then_get_round_trips() {
        let registry = ModelRegistry::new();
        registry.load(linear(2.0));
        let scorer = registry.get(ModelId::Linear).unwrap();
        assert_eq!(scorer.score(&one_record(), None).unwrap(), 2.0);
        assert_eq!(registry.loaded(), vec![ModelId::Linear]);
    }

    #[test]
    fn hot_swap_keeps_old_arc_usable() {
        let registry = ModelRegistry::new();
        registry.load(linear(1.0));
        let before = registry.get(ModelId::Linear).unwrap();

        registry.load(linear(10.0));
        let after = registry.get(ModelId::Linear).unwrap();

        // The in-flight handle still serves the old parameters in full;
        // new fetches see the replacement in full.
        assert_eq!(before.score(&one_record(), None).unwrap(), 1.0);
        assert_eq!(after.score(&one_record(), None).unwrap(), 10.0);
    }
}
