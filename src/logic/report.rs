//! Reports
//!
//! CSV rendering and summary statistics over persisted analysis
//! records. Pure functions; the caller fetches rows from storage and
//! decides where the output goes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logic::storage::TestRecord;

/// Column header matching the exported spreadsheet format
pub const CSV_HEADER: &str =
    "Test ID,Timestamp,Sample Type,Test Mode,Frequency,Amplitude,Q-Factor,Purity Grade,Purity %,Confidence,Certificate ID";

/// Render records as CSV, header first
pub fn to_csv(records: &[TestRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{}\n",
            r.test_id,
            r.recorded_at,
            r.sample_type,
            r.test_mode,
            r.frequency,
            r.amplitude,
            r.q_factor,
            r.grade,
            r.percentage,
            r.confidence,
            r.certificate_id,
        ));
    }

    out
}

/// Aggregate view over a set of analyses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total_tests: usize,
    /// Mean purity percentage, two decimals; 0.0 when empty
    pub average_purity: f64,
    /// Analyses per grade label
    pub grade_distribution: BTreeMap<String, usize>,
    /// Most recent test IDs, newest first
    pub recent_tests: Vec<String>,
}

/// How many recent test IDs the summary carries
const RECENT_COUNT: usize = 5;

/// Summarize records already sorted newest-first (as `history` returns)
pub fn summarize(records: &[TestRecord]) -> Summary {
    let total_tests = records.len();

    let average_purity = if records.is_empty() {
        0.0
    } else {
        let sum: f64 = records.iter().map(|r| r.percentage).sum();
        (sum / total_tests as f64 * 100.0).round() / 100.0
    };

    let mut grade_distribution = BTreeMap::new();
    for r in records {
        *grade_distribution.entry(r.grade.as_str().to_string()).or_insert(0) += 1;
    }

    let recent_tests = records
        .iter()
        .take(RECENT_COUNT)
        .map(|r| r.test_id.clone())
        .collect();

    Summary {
        total_tests,
        average_purity,
        grade_distribution,
        recent_tests,
    }
}
