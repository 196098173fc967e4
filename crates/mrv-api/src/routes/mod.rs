//! # API Route Modules
//!
//! - `usage`: raw usage rows, per-device statistics, and the daily export.
//! - `credentials`: verifiable credential issuance for daily usage facts.
//! - `verify`: standalone Ed25519 signature verification.

pub mod credentials;
pub mod usage;
pub mod verify;
