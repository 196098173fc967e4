//! # mrv-cli: MRV Stack Operator Command-Line Interface
//!
//! Operator tooling for the device key store and the credential pipeline,
//! usable without a running API server.
//!
//! ## Subcommands
//!
//! - `keygen`: provision a device key pair (idempotent)
//! - `show-key`: inspect a device's public key and fingerprint
//! - `issue`: issue a credential offline for a hand-supplied usage fact
//! - `verify`: verify a detached hex signature against a public key
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to domain crates and return their output as
//!   a string, so tests can call them without capturing stdout.
//! - Private key material is never printed; only public halves and
//!   fingerprints appear in output.

pub mod issue;
pub mod keys;
pub mod verify;
