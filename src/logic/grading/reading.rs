//! Resonance Reading - Core data structure for classifier input
//!
//! One electromagnetic resonance measurement of a sample. The request
//! layer owns range validation; this type only rejects values the
//! classifier cannot work with at all (NaN / infinity).

use serde::{Deserialize, Serialize};

use super::layout::FEATURE_COUNT;

/// A measured resonance response, in feature-layout order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResonanceReading {
    /// Resonant frequency in Hz
    pub frequency: f64,
    /// Normalized response amplitude
    pub amplitude: f64,
    /// Resonance quality factor
    pub q_factor: f64,
}

impl ResonanceReading {
    pub fn new(frequency: f64, amplitude: f64, q_factor: f64) -> Self {
        Self {
            frequency,
            amplitude,
            q_factor,
        }
    }

    /// Values in the order defined by `layout::FEATURE_LAYOUT`
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [self.frequency, self.amplitude, self.q_factor]
    }

    /// Reject non-finite measurements. Out-of-range but finite values
    /// pass; the model answers for those, the caller screens them.
    pub fn validate(&self) -> Result<(), InvalidReadingError> {
        for (i, value) in self.as_array().into_iter().enumerate() {
            if !value.is_finite() {
                return Err(InvalidReadingError {
                    field: super::layout::FEATURE_LAYOUT[i],
                    value,
                });
            }
        }
        Ok(())
    }
}

/// A reading contained NaN or infinity
#[derive(Debug, Clone)]
pub struct InvalidReadingError {
    pub field: &'static str,
    pub value: f64,
}

impl std::fmt::Display for InvalidReadingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid reading: {} is {}", self.field, self.value)
    }
}

impl std::error::Error for InvalidReadingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_order_matches_layout() {
        let reading = ResonanceReading::new(950_000.0, 0.98, 87.0);
        assert_eq!(reading.as_array(), [950_000.0, 0.98, 87.0]);
    }

    #[test]
    fn test_finite_reading_passes() {
        assert!(ResonanceReading::new(655_000.0, 0.58, 48.0).validate().is_ok());
        // Negative and zero values are the caller's problem, not ours
        assert!(ResonanceReading::new(-1.0, 0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn test_nan_rejected() {
        let err = ResonanceReading::new(f64::NAN, 0.9, 80.0).validate().unwrap_err();
        assert_eq!(err.field, "resonance_frequency");
    }

    #[test]
    fn test_infinity_rejected() {
        let err = ResonanceReading::new(900_000.0, f64::INFINITY, 80.0)
            .validate()
            .unwrap_err();
        assert_eq!(err.field, "amplitude");
    }
}
