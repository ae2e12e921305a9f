//! Certificate Issuance
//!
//! Pure construction: no persistence, no clock access. The caller
//! supplies the issuance instant, and the exact timestamp string used
//! in the digest is returned on the certificate so collaborators can
//! store it verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::logic::grading::{ClassificationResult, PurityGrade};

/// Certificate ID prefix
const CERT_PREFIX: &str = "AURA";

/// Hex length of a derived test ID
const TEST_ID_LEN: usize = 16;

/// An issued purity certificate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    /// `AURA-<YYYYMMDD>-<uppercased test id>`
    pub certificate_id: String,
    pub test_id: String,
    pub grade: PurityGrade,
    pub percentage: f64,
    /// The exact ISO 8601 string hashed into the digest. Store this
    /// verbatim; verification re-hashes the stored string.
    pub issued_at: String,
    /// Hex SHA-256 over `test_id:grade:percentage:issued_at`
    pub digest: String,
}

/// Derive a test ID for a new analysis session: the first 16 hex
/// characters of `SHA256(device_id + "_" + timestamp)`. Owned by the
/// request layer, defined here because the certificate digest depends
/// on its shape.
pub fn derive_test_id(device_id: &str, requested_at: DateTime<Utc>) -> String {
    let material = format!("{}_{}", device_id, requested_at.to_rfc3339());
    let digest = Sha256::digest(material.as_bytes());
    hex::encode(digest)[..TEST_ID_LEN].to_string()
}

/// Hex SHA-256 binding the result fields together. The percentage is
/// rendered with one decimal so the digest recomputes identically from
/// a stored row.
pub fn binding_digest(test_id: &str, grade: PurityGrade, percentage: f64, issued_at_iso: &str) -> String {
    let material = format!("{}:{}:{:.1}:{}", test_id, grade, percentage, issued_at_iso);
    hex::encode(Sha256::digest(material.as_bytes()))
}

/// Issue a certificate for a classification result
pub fn issue(test_id: &str, result: &ClassificationResult, issued_at: DateTime<Utc>) -> Certificate {
    let issued_at_iso = issued_at.to_rfc3339();
    let certificate_id = format!(
        "{}-{}-{}",
        CERT_PREFIX,
        issued_at.format("%Y%m%d"),
        test_id.to_uppercase()
    );
    let digest = binding_digest(test_id, result.grade, result.percentage, &issued_at_iso);

    Certificate {
        certificate_id,
        test_id: test_id.to_string(),
        grade: result.grade,
        percentage: result.percentage,
        issued_at: issued_at_iso,
        digest,
    }
}
