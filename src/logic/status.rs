//! Device & Engine Status
//!
//! Bookkeeping snapshots for the UI layer: the analyzer hardware state
//! as last reported, and the classification engine's own state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::grading::layout::{layout_hash, FEATURE_COUNT, FEATURE_VERSION};
use crate::logic::model::PurityClassifier;

/// Last reported analyzer hardware state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub battery_level: f64,
    pub is_connected: bool,
    pub signal_strength: f64,
    pub temperature: f64,
    pub calibration_status: String,
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self {
            battery_level: 87.0,
            is_connected: true,
            signal_strength: 85.0,
            temperature: 25.0,
            calibration_status: "calibrated".to_string(),
        }
    }
}

/// Snapshot of the classification engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_ready: bool,
    pub trained_at: Option<DateTime<Utc>>,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_count: usize,
    pub inference_count: u64,
    pub training_count: u64,
}

/// Collect the engine snapshot from a live classifier
pub fn collect(classifier: &PurityClassifier) -> EngineStatus {
    EngineStatus {
        model_ready: classifier.is_ready(),
        trained_at: classifier.trained_at(),
        feature_version: FEATURE_VERSION,
        layout_hash: layout_hash(),
        feature_count: FEATURE_COUNT,
        inference_count: classifier.inference_count(),
        training_count: classifier.training_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::grading::ResonanceReading;
    use crate::logic::model::ModelStore;

    #[test]
    fn test_default_matches_factory_calibration() {
        let status = DeviceStatus::default();
        assert_eq!(status.battery_level, 87.0);
        assert_eq!(status.signal_strength, 85.0);
        assert_eq!(status.temperature, 25.0);
        assert_eq!(status.calibration_status, "calibrated");
        assert!(status.is_connected);
    }

    #[test]
    fn test_engine_status_tracks_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = PurityClassifier::new(ModelStore::new(dir.path()));

        let before = collect(&classifier);
        assert!(!before.model_ready);
        assert_eq!(before.inference_count, 0);
        assert!(before.trained_at.is_none());

        classifier
            .predict(&ResonanceReading::new(950_000.0, 0.98, 87.0))
            .unwrap();

        let after = collect(&classifier);
        assert!(after.model_ready);
        assert_eq!(after.inference_count, 1);
        assert_eq!(after.training_count, 1);
        assert!(after.trained_at.is_some());
    }
}
