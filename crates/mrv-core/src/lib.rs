//! # mrv-core: Foundational Types for the MRV Credential Stack
//!
//! This crate defines the types every other crate in the workspace builds on:
//!
//! - [`CanonicalBytes`]: the sole construction path for signable bytes
//!   (RFC 8785 / JCS serialization with the stack's numeric normalization).
//! - [`Timestamp`]: UTC-only timestamps truncated to whole seconds,
//!   rendered `YYYY-MM-DDTHH:MM:SSZ`.
//! - [`UsageFact`]: one device's measured daily energy usage, the record
//!   credentials attest to.
//! - The error hierarchy ([`CanonicalError`], [`CryptoError`],
//!   [`KeyStoreError`], [`TimestampError`]) shared across the stack.
//!
//! Crates higher in the stack (`mrv-crypto`, `mrv-vc`, `mrv-api`) return
//! these error types rather than defining parallel hierarchies, so the
//! failure taxonomy stays consistent from keystore to HTTP boundary.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod error;
pub mod temporal;
pub mod usage;

pub use canonical::CanonicalBytes;
pub use error::{CanonicalError, CryptoError, KeyStoreError, TimestampError};
pub use temporal::Timestamp;
pub use usage::UsageFact;
