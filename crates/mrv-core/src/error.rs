//! # Error Types
//!
//! Defines the error types used throughout the MRV credential stack. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - One enum per concern: canonicalization, crypto encoding/signing, key
//!   storage, timestamps.
//! - A failed signature *check* is not an error. Verification returns
//!   `bool`; only undecodable input ([`CryptoError::InvalidEncoding`])
//!   surfaces as an `Err`, so callers can always tell "malformed request"
//!   apart from "valid request, invalid signature".
//! - Key storage corruption (missing half, bad hex, mismatched halves) is
//!   [`KeyStoreError::Storage`]. It fails hard rather than silently
//!   regenerating a key and breaking linkage to previously issued
//!   credentials.
//! - Error messages never carry private key material. Key pair types have
//!   no `Display`/`Serialize` surface that could leak into a message.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalError {
    /// Non-finite numbers (NaN, ±infinity) have no JSON representation.
    /// serde_json would silently serialize them as `null`, which breaks the
    /// injectivity requirement on canonical bytes, so they are rejected
    /// before serialization.
    #[error("non-finite number {0} cannot be canonicalized")]
    NonFiniteNumber(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic encoding and signing operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Caller-supplied key or signature text could not be decoded into the
    /// fixed-length byte form the scheme requires.
    #[error("invalid {what} encoding: {reason}")]
    InvalidEncoding {
        /// What was being decoded ("public key", "signature", "key pair").
        what: &'static str,
        /// Why the decode failed.
        reason: String,
    },

    /// The signing primitive itself failed. Treated as fatal; retries, if
    /// any, belong to the caller.
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// Error in key pair persistence.
#[derive(Error, Debug)]
pub enum KeyStoreError {
    /// No key pair is stored for the device. Returned only by pure reads;
    /// `get_or_create` converts this case into key generation.
    #[error("no key pair stored for device {device_id:?}")]
    NotFound {
        /// The device whose key pair was requested.
        device_id: String,
    },

    /// The device identifier cannot be used as a storage key.
    #[error("invalid device id {device_id:?}: {reason}")]
    InvalidDeviceId {
        /// The rejected identifier.
        device_id: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The storage medium failed, or stored key material is corrupted
    /// (wrong length, undecodable hex, a single half present, or halves
    /// from different generations).
    #[error("key storage failure for device {device_id:?}: {reason}")]
    Storage {
        /// The device whose key material was being read or written.
        device_id: String,
        /// Underlying I/O or corruption detail.
        reason: String,
    },
}

/// Error parsing or constructing a [`crate::Timestamp`].
#[derive(Error, Debug)]
pub enum TimestampError {
    /// Timestamps must use the `Z` suffix. Offsets such as `+00:00` are
    /// rejected even though they denote the same instant, because they
    /// would canonicalize to different bytes.
    #[error("timestamp must use Z suffix (UTC only), got {0:?}")]
    NonUtc(String),

    /// The input is not a valid RFC 3339 timestamp.
    #[error("invalid RFC 3339 timestamp {input:?}: {reason}")]
    Invalid {
        /// The rejected input.
        input: String,
        /// Parser detail.
        reason: String,
    },
}
