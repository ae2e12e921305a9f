//! Certificate Module - Issuance & Integrity
//!
//! A certificate binds one analysis result to a test ID through a
//! SHA-256 digest. The digest is a local deterministic fingerprint, not
//! a ledger anchor and not a signature: it catches mutation of the
//! stored fields, but an attacker who can rewrite the row and the
//! digest together defeats it.

pub mod issuer;
pub mod verifier;

pub use issuer::{derive_test_id, issue, Certificate};
pub use verifier::{verify, verify_lookup, StoredCertificate, VerifyFailure, VerifyOutcome};
