//! Purity Grades
//!
//! The four karat grades the analyzer reports, ordered by ascending
//! purity. The ordinal position doubles as the regression target during
//! training, so the ordering here is load-bearing.

use serde::{Deserialize, Serialize};

/// Discrete purity grade of a gold sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PurityGrade {
    #[serde(rename = "14K")]
    K14,
    #[serde(rename = "18K")]
    K18,
    #[serde(rename = "22K")]
    K22,
    #[serde(rename = "24K")]
    K24,
}

/// All grades in ascending purity order (ordinal 0..=3)
pub const GRADE_ORDER: [PurityGrade; 4] = [
    PurityGrade::K14,
    PurityGrade::K18,
    PurityGrade::K22,
    PurityGrade::K24,
];

impl PurityGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurityGrade::K14 => "14K",
            PurityGrade::K18 => "18K",
            PurityGrade::K22 => "22K",
            PurityGrade::K24 => "24K",
        }
    }

    /// Position on the ordinal grade scale (14K = 0 ... 24K = 3)
    pub fn ordinal(&self) -> usize {
        match self {
            PurityGrade::K14 => 0,
            PurityGrade::K18 => 1,
            PurityGrade::K22 => 2,
            PurityGrade::K24 => 3,
        }
    }

    /// Grade for a clamped ordinal index
    pub fn from_ordinal(index: usize) -> PurityGrade {
        GRADE_ORDER[index.min(GRADE_ORDER.len() - 1)]
    }

    /// Canonical gold content for the grade. A closed lookup table, not
    /// a computed value.
    pub fn percentage(&self) -> f64 {
        match self {
            PurityGrade::K14 => 58.3,
            PurityGrade::K18 => 75.0,
            PurityGrade::K22 => 91.7,
            PurityGrade::K24 => 99.9,
        }
    }

    pub fn parse(s: &str) -> Option<PurityGrade> {
        GRADE_ORDER.iter().copied().find(|g| g.as_str() == s)
    }
}

impl std::fmt::Display for PurityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one purity prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub grade: PurityGrade,
    /// From the closed table, one decimal
    pub percentage: f64,
    /// Plausibility score in [70.0, 95.0], one decimal. Not a
    /// statistically calibrated interval.
    pub confidence: f64,
}
