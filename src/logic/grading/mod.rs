//! Grading Module - Domain Types
//!
//! Data definitions only. The resonance feature layout, the measured
//! reading, and the purity grade scale live here; all engines build on
//! these types.

pub mod layout;
pub mod reading;
pub mod grade;

pub use grade::{ClassificationResult, PurityGrade};
pub use reading::{InvalidReadingError, ResonanceReading};
