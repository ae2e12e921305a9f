//! Feature Standardization
//!
//! Per-feature mean/deviation fitted on the training corpus and applied
//! unchanged at prediction time. Persisted as one of the two model
//! artifacts, so the struct is plain data.

use serde::{Deserialize, Serialize};

use crate::logic::grading::layout::FEATURE_COUNT;

/// Fitted standardization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; FEATURE_COUNT],
    pub scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Fit mean and standard deviation per feature.
    ///
    /// A feature with zero spread gets scale 1.0 so transform stays
    /// finite.
    pub fn fit(rows: &[[f64; FEATURE_COUNT]]) -> StandardScaler {
        let n = rows.len().max(1) as f64;

        let mut mean = [0.0; FEATURE_COUNT];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut scale = [0.0; FEATURE_COUNT];
        for row in rows {
            for i in 0..FEATURE_COUNT {
                let d = row[i] - mean[i];
                scale[i] += d * d;
            }
        }
        for s in &mut scale {
            *s = (*s / n).sqrt();
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        StandardScaler { mean, scale }
    }

    /// Standardize one feature row
    pub fn transform(&self, row: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            out[i] = (row[i] - self.mean[i]) / self.scale[i];
        }
        out
    }
}
