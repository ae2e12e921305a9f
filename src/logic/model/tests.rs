use std::sync::Arc;

use crate::logic::grading::{PurityGrade, ResonanceReading};
use crate::logic::model::corpus::GRADE_SIGNATURES;
use crate::logic::model::forest::ForestConfig;
use crate::logic::model::store::{ModelStore, FOREST_FILE, SCALER_FILE};
use crate::logic::model::{PurityClassifier, TrainConfig};

fn test_config() -> TrainConfig {
    TrainConfig {
        corpus_seed: 42,
        samples_per_grade: 120,
        forest: ForestConfig { trees: 25, ..Default::default() },
    }
}

fn classifier_in(dir: &std::path::Path) -> PurityClassifier {
    PurityClassifier::with_confidence_seed(ModelStore::new(dir), test_config(), 7)
}

#[test]
fn test_base_signatures_classify_to_their_grade() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = classifier_in(dir.path());

    for sig in GRADE_SIGNATURES {
        let reading = ResonanceReading::new(sig.freq_base, sig.amp_base, sig.q_base);
        let prediction = classifier.predict(&reading).unwrap();
        assert_eq!(prediction.classification.grade, sig.grade);
        assert_eq!(prediction.classification.percentage, sig.grade.percentage());
    }
}

#[test]
fn test_confidence_and_percentage_invariants() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = classifier_in(dir.path());

    let readings = [
        ResonanceReading::new(950_000.0, 0.98, 87.0),
        ResonanceReading::new(700_000.0, 0.6, 50.0),
        ResonanceReading::new(0.0, 0.0, 0.0),
        ResonanceReading::new(-5_000.0, 12.0, 900.0),
        ResonanceReading::new(2_000_000.0, 0.01, 1.0),
    ];

    for reading in &readings {
        for _ in 0..20 {
            let c = classifier.predict(reading).unwrap().classification;
            assert!((70.0..=95.0).contains(&c.confidence), "confidence {}", c.confidence);
            // Rounded to one decimal
            assert_eq!((c.confidence * 10.0).round() / 10.0, c.confidence);
            assert!([58.3, 75.0, 91.7, 99.9].contains(&c.percentage));
        }
    }
}

#[test]
fn test_first_predict_self_heals_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = classifier_in(dir.path());
    let store = ModelStore::new(dir.path());

    assert!(!classifier.is_ready());
    assert!(!store.exists());

    let prediction = classifier
        .predict(&ResonanceReading::new(890_000.0, 0.89, 76.0))
        .unwrap();

    assert!(prediction.artifact_cached);
    assert!(classifier.is_ready());
    assert!(store.exists());
    assert_eq!(classifier.training_count(), 1);

    // Second call reuses the installed model
    classifier
        .predict(&ResonanceReading::new(655_000.0, 0.58, 48.0))
        .unwrap();
    assert_eq!(classifier.training_count(), 1);
}

#[test]
fn test_persisted_model_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    let trainer = classifier_in(dir.path());
    trainer.train().unwrap();

    let probes = [
        ResonanceReading::new(655_000.0, 0.58, 48.0),
        ResonanceReading::new(765_000.0, 0.73, 62.0),
        ResonanceReading::new(890_000.0, 0.89, 76.0),
        ResonanceReading::new(950_000.0, 0.98, 87.0),
        ResonanceReading::new(820_000.0, 0.8, 70.0),
    ];

    // Fresh classifier over the same directory loads instead of training
    let loader = classifier_in(dir.path());
    for probe in &probes {
        let trained = trainer.predict(probe).unwrap().classification.grade;
        let loaded = loader.predict(probe).unwrap().classification.grade;
        assert_eq!(trained, loaded);
    }
    assert_eq!(loader.training_count(), 0);
}

#[test]
fn test_corrupt_artifacts_trigger_retrain() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(SCALER_FILE), b"{broken").unwrap();
    std::fs::write(dir.path().join(FOREST_FILE), b"{broken").unwrap();

    let classifier = classifier_in(dir.path());
    let prediction = classifier
        .predict(&ResonanceReading::new(950_000.0, 0.98, 87.0))
        .unwrap();

    assert_eq!(prediction.classification.grade, PurityGrade::K24);
    assert_eq!(classifier.training_count(), 1);
    // Overwritten with good artifacts
    assert!(ModelStore::new(dir.path()).load().is_ok());
}

#[test]
fn test_layout_mismatch_triggers_retrain() {
    let dir = tempfile::tempdir().unwrap();

    // Persist a valid model, then stamp it with a foreign layout version
    let trainer = classifier_in(dir.path());
    trainer.train().unwrap();
    for name in [SCALER_FILE, FOREST_FILE] {
        let path = dir.path().join(name);
        let mut value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        value["meta"]["feature_version"] = serde_json::json!(99);
        std::fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();
    }

    let classifier = classifier_in(dir.path());
    classifier
        .predict(&ResonanceReading::new(655_000.0, 0.58, 48.0))
        .unwrap();
    assert_eq!(classifier.training_count(), 1);
}

#[test]
fn test_unwritable_store_still_predicts() {
    let dir = tempfile::tempdir().unwrap();

    // A regular file where the artifact directory should be makes every
    // save fail while training itself stays possible
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let classifier = classifier_in(&blocker.join("models"));

    let prediction = classifier
        .predict(&ResonanceReading::new(950_000.0, 0.98, 87.0))
        .unwrap();
    assert_eq!(prediction.classification.grade, PurityGrade::K24);
    assert!(!prediction.artifact_cached);

    // Explicit training surfaces the persistence failure
    assert!(classifier.train().is_err());
}

#[test]
fn test_concurrent_first_use_trains_once() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = Arc::new(classifier_in(dir.path()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let classifier = Arc::clone(&classifier);
            std::thread::spawn(move || {
                let sig = GRADE_SIGNATURES[i % GRADE_SIGNATURES.len()];
                let reading = ResonanceReading::new(sig.freq_base, sig.amp_base, sig.q_base);
                let prediction = classifier.predict(&reading).unwrap();
                assert_eq!(prediction.classification.grade, sig.grade);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(classifier.training_count(), 1);
    assert_eq!(classifier.inference_count(), 8);
}

#[test]
fn test_non_finite_reading_rejected_without_training() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = classifier_in(dir.path());

    let err = classifier
        .predict(&ResonanceReading::new(f64::NAN, 0.9, 80.0))
        .unwrap_err();
    assert_eq!(err.field, "resonance_frequency");

    // Rejection happens before any model work
    assert_eq!(classifier.training_count(), 0);
    assert!(!classifier.is_ready());
}

#[test]
fn test_off_center_readings_round_to_nearest_grade() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = classifier_in(dir.path());

    // Slightly perturbed 22K signature still grades 22K
    let c = classifier
        .predict(&ResonanceReading::new(885_000.0, 0.90, 75.0))
        .unwrap()
        .classification;
    assert_eq!(c.grade, PurityGrade::K22);

    // Far beyond the 24K base clamps to the top of the scale
    let c = classifier
        .predict(&ResonanceReading::new(2_000_000.0, 1.5, 200.0))
        .unwrap()
        .classification;
    assert_eq!(c.grade, PurityGrade::K24);
}
