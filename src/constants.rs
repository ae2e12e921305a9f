//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change a default path or training parameter, only edit this file.

use std::path::PathBuf;

/// App name
pub const APP_NAME: &str = "AURA Purity Core";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory name under the platform data dir where everything is kept
pub const DATA_DIR_NAME: &str = "aura-analyzer";

/// Default database file name
pub const DEFAULT_DB_FILE: &str = "aura_database.db";

/// Default synthetic corpus seed
pub const DEFAULT_CORPUS_SEED: u64 = 42;

/// Default samples drawn per grade (4 grades -> 1000 total)
pub const DEFAULT_SAMPLES_PER_GRADE: usize = 250;

/// App data directory (platform-local)
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model artifact directory from environment or use default
pub fn get_model_dir() -> PathBuf {
    std::env::var("AURA_MODEL_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir().join("models"))
}

/// Get database path from environment or use default
pub fn get_db_path() -> PathBuf {
    std::env::var("AURA_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir().join(DEFAULT_DB_FILE))
}

/// Get corpus seed from environment or use default
pub fn get_corpus_seed() -> u64 {
    std::env::var("AURA_CORPUS_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_CORPUS_SEED)
}

/// Get samples per grade from environment or use default
pub fn get_samples_per_grade() -> usize {
    std::env::var("AURA_SAMPLES_PER_GRADE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SAMPLES_PER_GRADE)
}
