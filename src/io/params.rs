//! Read/write fitted-parameter JSON files.
//!
//! A parameter file is the portable representation of one fitted model:
//! a `family`-tagged document holding the family-specific state (weights +
//! intercept; ordered tree list; network weights + Weibull head). Produced by
//! the external training pipeline (or `ipr gen`), loaded once at registry
//! init, immutable afterwards.
//!
//! The schema is defined by `models::ParamsFile`.

use std::fs::File;
use std::path::Path;

use crate::error::RequestError;
use crate::models::ParamsFile;

/// Write a fitted-parameter JSON file.
pub fn write_params_json(path: &Path, params: &ParamsFile) -> Result<(), RequestError> {
    let file = File::create(path).map_err(|e| {
        RequestError::Io(format!(
            "Failed to create parameter file '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, params)
        .map_err(|e| RequestError::Io(format!("Failed to write parameter JSON: {e}")))?;
    Ok(())
}

/// Read a fitted-parameter JSON file.
pub fn read_params_json(path: &Path) -> Result<ParamsFile, RequestError> {
    let file = File::open(path).map_err(|e| {
        RequestError::Io(format!(
            "Failed to open parameter file '{}': {e}",
            path.display()
        ))
    })?;
    let params: ParamsFile = serde_json::from_reader(file).map_err(|e| {
        RequestError::Config(format!(
            "Invalid parameter JSON '{}': {e}",
            path.display()
        ))
    })?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelId;
    use crate::models::{LinearParams, ParamsFile};

    #[test]
    fn linear_params_round_trip() {
        let dir = std::env::temp_dir().join("ipr-params-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("linear.json");

        let params = ParamsFile::Linear(LinearParams {
            weights: vec![0.5, -1.25],
            intercept: 0.125,
        });
        write_params_json(&path, &params).unwrap();

        let loaded = read_params_json(&path).unwrap();
        assert_eq!(loaded.model_id(), ModelId::Linear);
        match loaded {
            ParamsFile::Linear(p) => {
                assert_eq!(p.weights, vec![0.5, -1.25]);
                assert_eq!(p.intercept, 0.125);
            }
            other => panic!("unexpected family: {:?}", other.model_id()),
        }

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_params_json(Path::new("/nonexistent/params.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
