//! # Usage Facts
//!
//! [`UsageFact`] is the record the credential subsystem attests to: one
//! device's measured energy usage for one calendar day. Facts are produced
//! by an external collaborator (the usage store) and are immutable once
//! fetched.

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;

/// A device's measured daily energy usage.
///
/// Serde field names are part of the wire contract. `device_id`, `date`,
/// and `value` are the exact keys that appear in the credential subject
/// and therefore in the signed canonical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageFact {
    /// Stable external device identifier.
    pub device_id: String,
    /// Calendar date of the reading, `YYYY-MM-DD`.
    pub date: String,
    /// Measured energy quantity for the day.
    pub value: f64,
}

impl UsageFact {
    /// Build a fact from its parts.
    pub fn new(device_id: impl Into<String>, date: impl Into<String>, value: f64) -> Self {
        Self {
            device_id: device_id.into(),
            date: date.into(),
            value,
        }
    }

    /// Check that the fact can be canonicalized and signed.
    ///
    /// A non-finite value has no JSON representation, so it can never make
    /// it into canonical bytes. Device id constraints are enforced by the
    /// key store, which sees every id before signing.
    pub fn validate(&self) -> Result<(), CanonicalError> {
        if !self.value.is_finite() {
            return Err(CanonicalError::NonFiniteNumber(self.value));
        }
        Ok(())
    }
}
