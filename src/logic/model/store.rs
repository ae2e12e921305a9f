//! Model Artifact Store
//!
//! Persists the two fitted artifacts (scaler, forest) as JSON envelopes
//! under the model directory. Writes go to a temp file first and are
//! renamed into place, so a concurrent reader never sees a half-written
//! artifact. Load refuses envelopes fitted against a different feature
//! layout.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::logic::grading::layout::{layout_hash, validate_layout, FEATURE_VERSION};

use super::forest::RandomForest;
use super::scaler::StandardScaler;

/// Scaler artifact file name
pub const SCALER_FILE: &str = "scaler.json";

/// Regressor artifact file name
pub const FOREST_FILE: &str = "purity_forest.json";

/// Provenance carried by both artifact files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub trained_at: DateTime<Utc>,
    pub corpus_seed: u64,
    pub samples_per_grade: usize,
}

impl ArtifactMeta {
    pub fn new(trained_at: DateTime<Utc>, corpus_seed: u64, samples_per_grade: usize) -> Self {
        Self {
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            trained_at,
            corpus_seed,
            samples_per_grade,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    meta: ArtifactMeta,
    payload: T,
}

/// Model persistence errors
#[derive(Debug)]
pub enum ModelError {
    /// At least one artifact is missing; the caller should retrain
    NotFound,
    /// An artifact exists but cannot be trusted; retrain and overwrite
    Corrupt(String),
    Io(std::io::Error),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::NotFound => write!(f, "Model artifacts not found"),
            ModelError::Corrupt(e) => write!(f, "Model artifacts corrupt: {}", e),
            ModelError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::Io(err)
    }
}

/// Artifact directory handle
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the default platform data directory
    pub fn default_location() -> Self {
        Self::new(crate::constants::get_model_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Both artifacts present on disk
    pub fn exists(&self) -> bool {
        self.dir.join(SCALER_FILE).exists() && self.dir.join(FOREST_FILE).exists()
    }

    /// Persist both artifacts. Each file is written to a sibling temp
    /// path and renamed into place.
    pub fn save(
        &self,
        scaler: &StandardScaler,
        forest: &RandomForest,
        meta: ArtifactMeta,
    ) -> Result<(), ModelError> {
        fs::create_dir_all(&self.dir)?;

        self.write_atomic(SCALER_FILE, &Envelope { meta, payload: scaler })?;
        self.write_atomic(FOREST_FILE, &Envelope { meta, payload: forest })?;

        log::info!("Model artifacts saved to {:?}", self.dir);
        Ok(())
    }

    /// Load both artifacts, validating their layout stamps.
    pub fn load(&self) -> Result<(StandardScaler, RandomForest, ArtifactMeta), ModelError> {
        let scaler_env: Envelope<StandardScaler> = self.read_envelope(SCALER_FILE)?;
        let forest_env: Envelope<RandomForest> = self.read_envelope(FOREST_FILE)?;

        if scaler_env.meta != forest_env.meta {
            return Err(ModelError::Corrupt(
                "scaler and forest artifacts are from different training runs".to_string(),
            ));
        }

        log::info!(
            "Model artifacts loaded (trained_at={}, seed={})",
            scaler_env.meta.trained_at,
            scaler_env.meta.corpus_seed
        );

        Ok((scaler_env.payload, forest_env.payload, forest_env.meta))
    }

    /// Remove both artifacts if present
    pub fn delete(&self) -> Result<(), ModelError> {
        for name in [SCALER_FILE, FOREST_FILE] {
            let path = self.dir.join(name);
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn write_atomic<T: Serialize>(&self, name: &str, envelope: &Envelope<T>) -> Result<(), ModelError> {
        let json = serde_json::to_vec_pretty(envelope)
            .map_err(|e| ModelError::Corrupt(e.to_string()))?;

        let final_path = self.dir.join(name);
        let tmp_path = self.dir.join(format!("{}.tmp", name));

        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    fn read_envelope<T: DeserializeOwned>(&self, name: &str) -> Result<Envelope<T>, ModelError> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Err(ModelError::NotFound);
        }

        let data = fs::read(&path)?;
        let envelope: Envelope<T> =
            serde_json::from_slice(&data).map_err(|e| ModelError::Corrupt(e.to_string()))?;

        validate_layout(envelope.meta.feature_version, envelope.meta.layout_hash)
            .map_err(|e| ModelError::Corrupt(e.to_string()))?;

        Ok(envelope)
    }
}
