//! # Verifiable Credentials
//!
//! Turns device usage facts into signed W3C-shaped verifiable credentials.
//!
//! The pipeline: a [`CredentialSubject`] carries the claims, its RFC 8785
//! canonical bytes are what the device key signs, and the resulting
//! [`Proof`] completes a [`VerifiableCredential`]. [`CredentialIssuer`]
//! drives the whole thing against a key store and, optionally, a remote
//! anchor signer.
//!
//! Credential JSON is wire-stable: field names and ordering are part of the
//! format, not an implementation detail.

pub mod credential;
pub mod error;
pub mod issuance;
pub mod issuer;
pub mod proof;

pub use credential::{CredentialEnvelope, CredentialSubject, VerifiableCredential};
pub use error::VcError;
pub use issuance::{CredentialIssuer, IssuedCredential};
pub use issuer::IssuerConfig;
pub use proof::{Proof, ProofPurpose, ProofType};
