//! Purity Classifier
//!
//! Owns the one active trained model for the process. Construct it once
//! and hand references to whoever needs predictions; tests build their
//! own instance over a temp store.
//!
//! Lifecycle: the model slot starts empty. The first `predict` takes the
//! slot mutex, tries to load persisted artifacts, and trains from
//! scratch when none are usable. Callers racing that first prediction
//! block on the same mutex and reuse the installed model, so at most one
//! training run happens per process.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::logic::grading::{ClassificationResult, InvalidReadingError, PurityGrade, ResonanceReading};

use super::corpus;
use super::forest::{ForestConfig, RandomForest};
use super::scaler::StandardScaler;
use super::store::{ArtifactMeta, ModelError, ModelStore};

/// Confidence draw parameters: clamp(85 + Normal(0, 10), 70, 95)
const CONFIDENCE_CENTER: f64 = 85.0;
const CONFIDENCE_SPREAD: f64 = 10.0;
const CONFIDENCE_MIN: f64 = 70.0;
const CONFIDENCE_MAX: f64 = 95.0;

/// Training inputs
#[derive(Debug, Clone, Copy)]
pub struct TrainConfig {
    pub corpus_seed: u64,
    pub samples_per_grade: usize,
    pub forest: ForestConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            corpus_seed: crate::constants::DEFAULT_CORPUS_SEED,
            samples_per_grade: crate::constants::DEFAULT_SAMPLES_PER_GRADE,
            forest: ForestConfig::default(),
        }
    }
}

/// The in-memory fitted state
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub scaler: StandardScaler,
    pub forest: RandomForest,
    pub meta: ArtifactMeta,
}

/// One prediction plus artifact bookkeeping
#[derive(Debug, Clone, Copy)]
pub struct Prediction {
    pub classification: ClassificationResult,
    /// False when this call had to train and the artifacts could not be
    /// persisted; the result is still valid, the next process will
    /// retrain.
    pub artifact_cached: bool,
}

pub struct PurityClassifier {
    store: ModelStore,
    config: TrainConfig,
    model: Mutex<Option<Arc<TrainedModel>>>,
    confidence_rng: Mutex<StdRng>,
    inferences: AtomicU64,
    trainings: AtomicU64,
}

impl PurityClassifier {
    pub fn new(store: ModelStore) -> Self {
        Self::with_config(store, TrainConfig::default())
    }

    pub fn with_config(store: ModelStore, config: TrainConfig) -> Self {
        Self {
            store,
            config,
            model: Mutex::new(None),
            confidence_rng: Mutex::new(StdRng::from_entropy()),
            inferences: AtomicU64::new(0),
            trainings: AtomicU64::new(0),
        }
    }

    /// Pin the confidence draw for deterministic tests
    pub fn with_confidence_seed(store: ModelStore, config: TrainConfig, seed: u64) -> Self {
        let classifier = Self::with_config(store, config);
        *classifier.confidence_rng.lock() = StdRng::seed_from_u64(seed);
        classifier
    }

    /// Fit a fresh model from the synthetic corpus, install it, and
    /// persist the artifacts. A save failure is returned to the caller
    /// but the in-memory model stays installed and usable.
    pub fn train(&self) -> Result<(), ModelError> {
        let mut slot = self.model.lock();
        let (model, save_result) = self.fit_and_save();
        *slot = Some(Arc::new(model));
        save_result
    }

    /// Classify one reading. Never fails for a missing model: loads the
    /// persisted artifacts or trains on the spot, whichever works.
    pub fn predict(&self, reading: &ResonanceReading) -> Result<Prediction, InvalidReadingError> {
        reading.validate()?;

        let (model, artifact_cached) = self.ensure_model();

        let standardized = model.scaler.transform(&reading.as_array());
        let estimate = model.forest.predict(&standardized);

        // Continuous ordinal estimate -> nearest grade on the scale
        let ordinal = estimate.round().clamp(0.0, 3.0) as usize;
        let grade = PurityGrade::from_ordinal(ordinal);

        let classification = ClassificationResult {
            grade,
            percentage: grade.percentage(),
            confidence: self.draw_confidence(),
        };

        self.inferences.fetch_add(1, Ordering::Relaxed);
        Ok(Prediction { classification, artifact_cached })
    }

    /// True once a model is installed in memory
    pub fn is_ready(&self) -> bool {
        self.model.lock().is_some()
    }

    /// When the active model was trained, if one is installed
    pub fn trained_at(&self) -> Option<DateTime<Utc>> {
        self.model.lock().as_ref().map(|m| m.meta.trained_at)
    }

    pub fn inference_count(&self) -> u64 {
        self.inferences.load(Ordering::Relaxed)
    }

    pub fn training_count(&self) -> u64 {
        self.trainings.load(Ordering::Relaxed)
    }

    /// Get the model, initializing it if this is the first caller.
    /// Holding the slot mutex across load/train is what serializes
    /// concurrent first-use.
    fn ensure_model(&self) -> (Arc<TrainedModel>, bool) {
        let mut slot = self.model.lock();

        if let Some(model) = slot.as_ref() {
            return (Arc::clone(model), true);
        }

        match self.store.load() {
            Ok((scaler, forest, meta)) => {
                let model = Arc::new(TrainedModel { scaler, forest, meta });
                *slot = Some(Arc::clone(&model));
                (model, true)
            }
            Err(ModelError::NotFound) => {
                log::info!("No persisted model, training from synthetic corpus");
                self.self_heal(&mut slot)
            }
            Err(e) => {
                log::warn!("Persisted model unusable ({}), retraining", e);
                self.self_heal(&mut slot)
            }
        }
    }

    fn self_heal(&self, slot: &mut Option<Arc<TrainedModel>>) -> (Arc<TrainedModel>, bool) {
        let (model, save_result) = self.fit_and_save();
        let model = Arc::new(model);
        *slot = Some(Arc::clone(&model));

        let cached = match save_result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Trained model could not be cached to disk: {}", e);
                false
            }
        };
        (model, cached)
    }

    fn fit_and_save(&self) -> (TrainedModel, Result<(), ModelError>) {
        let corpus = corpus::generate(self.config.samples_per_grade, self.config.corpus_seed);
        let rows: Vec<_> = corpus.iter().map(|s| s.reading.as_array()).collect();
        let labels: Vec<f64> = corpus.iter().map(|s| s.label).collect();

        let scaler = StandardScaler::fit(&rows);
        let standardized: Vec<_> = rows.iter().map(|r| scaler.transform(r)).collect();
        let forest = RandomForest::fit(&standardized, &labels, self.config.forest);

        let meta = ArtifactMeta::new(Utc::now(), self.config.corpus_seed, self.config.samples_per_grade);
        self.trainings.fetch_add(1, Ordering::Relaxed);
        log::info!(
            "Model trained: {} samples, {} trees",
            rows.len(),
            forest.tree_count()
        );

        let save_result = self.store.save(&scaler, &forest, meta);
        (TrainedModel { scaler, forest, meta }, save_result)
    }

    fn draw_confidence(&self) -> f64 {
        let normal = Normal::new(0.0, CONFIDENCE_SPREAD).expect("spread is positive");
        let draw = CONFIDENCE_CENTER + normal.sample(&mut *self.confidence_rng.lock());
        let clamped = draw.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX);
        (clamped * 10.0).round() / 10.0
    }
}
