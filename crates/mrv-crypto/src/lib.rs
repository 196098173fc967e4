//! # mrv-crypto: Keys, Signatures, and Key Storage
//!
//! Ed25519 primitives for the MRV credential stack:
//!
//! - [`Ed25519PublicKey`], [`Ed25519Signature`]: fixed-length newtypes with
//!   hex serde, safe to put on the wire.
//! - [`Ed25519KeyPair`]: signing key pair; never serializable, `Debug`
//!   prints `<private>`.
//! - [`Signer`] / [`Verifier`]: the seams the issuance pipeline signs and
//!   verifies through, so a remote signer can replace the local one without
//!   touching the orchestrator.
//! - [`KeyStore`]: per-device key persistence with a filesystem
//!   implementation ([`FsKeyStore`]) and an in-memory one
//!   ([`MemoryKeyStore`]).
//!
//! Private key material stays inside this crate's types: nothing here logs,
//! serializes, or transmits a private half.

pub mod ed25519;
pub mod keystore;
pub mod signer;

pub use ed25519::{verify, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use keystore::{FsKeyStore, KeyStore, MemoryKeyStore};
pub use signer::{verify_hex_inputs, Signer, Verifier};
