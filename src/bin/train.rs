//! Train: fit and persist the purity model offline.
//!
//! The classifier self-heals on first use, so running this is optional;
//! it front-loads the training cost and sanity-checks the fitted model
//! against the known grade signatures.
//!
//! Configuration comes from the environment:
//!   AURA_MODEL_DIR          artifact directory
//!   AURA_CORPUS_SEED        corpus seed (default 42)
//!   AURA_SAMPLES_PER_GRADE  samples per grade (default 250)

use aura_purity_core::constants;
use aura_purity_core::logic::grading::ResonanceReading;
use aura_purity_core::logic::model::corpus::GRADE_SIGNATURES;
use aura_purity_core::logic::model::{ModelStore, PurityClassifier, TrainConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let model_dir = constants::get_model_dir();
    log::info!(
        "{} v{} - training purity model into {:?}",
        constants::APP_NAME,
        constants::APP_VERSION,
        model_dir
    );

    let config = TrainConfig {
        corpus_seed: constants::get_corpus_seed(),
        samples_per_grade: constants::get_samples_per_grade(),
        ..Default::default()
    };

    let classifier = PurityClassifier::with_config(ModelStore::new(&model_dir), config);

    if let Err(e) = classifier.train() {
        log::error!("Training could not persist artifacts: {}", e);
        std::process::exit(1);
    }

    // Sanity check: every grade signature must classify to itself
    for sig in GRADE_SIGNATURES {
        let reading = ResonanceReading::new(sig.freq_base, sig.amp_base, sig.q_base);
        match classifier.predict(&reading) {
            Ok(p) if p.classification.grade == sig.grade => {
                log::info!(
                    "  {} -> {} ({}%)",
                    sig.grade,
                    p.classification.grade,
                    p.classification.percentage
                );
            }
            Ok(p) => {
                log::error!("  {} misclassified as {}", sig.grade, p.classification.grade);
                std::process::exit(1);
            }
            Err(e) => {
                log::error!("  {} rejected: {}", sig.grade, e);
                std::process::exit(1);
            }
        }
    }

    log::info!("Model trained and saved");
}
