//! Model Module - Training & Prediction Engine
//!
//! Corpus generation, feature standardization, the tree-ensemble
//! regressor, artifact persistence, and the classifier that ties them
//! together.

pub mod corpus;
pub mod scaler;
pub mod forest;
pub mod store;
pub mod classifier;

#[cfg(test)]
mod tests;

pub use classifier::{Prediction, PurityClassifier, TrainConfig};
pub use store::{ModelError, ModelStore};
