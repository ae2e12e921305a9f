//! AURA Purity Core - Classification & Certification Engine
//!
//! Core library behind the AURA gold purity analyzer: electromagnetic
//! resonance readings go in, a purity grade with a tamper-evident
//! certificate comes out. Transport and UI layers live elsewhere and
//! call into this crate.

pub mod constants;
pub mod logic;
