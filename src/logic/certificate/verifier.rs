//! Certificate Verification
//!
//! Re-derives the binding digest from the stored record fields and
//! compares it to the stored digest. Verification never fails with an
//! error; every path produces a structured outcome.

use serde::{Deserialize, Serialize};

use crate::logic::grading::PurityGrade;

use super::issuer::binding_digest;

/// The fields of a persisted analysis row that the digest binds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCertificate {
    pub test_id: String,
    pub grade: PurityGrade,
    pub percentage: f64,
    /// The timestamp string exactly as it was stored at issuance
    pub issued_at: String,
    pub digest: String,
}

/// Why verification did not pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyFailure {
    NotFound,
    DigestMismatch,
}

impl VerifyFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyFailure::NotFound => "not_found",
            VerifyFailure::DigestMismatch => "digest_mismatch",
        }
    }
}

/// Structured verification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub valid: bool,
    pub reason: Option<VerifyFailure>,
}

impl VerifyOutcome {
    fn valid() -> Self {
        Self { valid: true, reason: None }
    }

    fn invalid(reason: VerifyFailure) -> Self {
        Self { valid: false, reason: Some(reason) }
    }
}

/// Check a stored record against its own digest
pub fn verify(record: &StoredCertificate) -> VerifyOutcome {
    let expected = binding_digest(&record.test_id, record.grade, record.percentage, &record.issued_at);

    if constant_time_compare(&expected, &record.digest) {
        VerifyOutcome::valid()
    } else {
        log::warn!("Digest mismatch for test {}", record.test_id);
        VerifyOutcome::invalid(VerifyFailure::DigestMismatch)
    }
}

/// Check the result of a record lookup; a missing record verifies as
/// `not_found` rather than an error
pub fn verify_lookup(record: Option<&StoredCertificate>) -> VerifyOutcome {
    match record {
        Some(record) => verify(record),
        None => VerifyOutcome::invalid(VerifyFailure::NotFound),
    }
}

/// Constant-time string comparison
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
