//! Linked-data proof types.

use mrv_core::Timestamp;
use serde::{Deserialize, Serialize};

/// Proof suite identifier. Only Ed25519 is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofType {
    /// `Ed25519Signature2018` on the wire.
    #[serde(rename = "Ed25519Signature2018")]
    Ed25519Signature2018,
}

/// Relationship between the proof and the credential it signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofPurpose {
    /// `assertionMethod` on the wire.
    #[serde(rename = "assertionMethod")]
    AssertionMethod,
}

/// The proof block of a verifiable credential.
///
/// Field order matters on the wire: `type`, `created`, `verificationMethod`,
/// `proofPurpose`, `jws`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    /// Proof suite.
    #[serde(rename = "type")]
    pub proof_type: ProofType,
    /// When the proof was created. Equals the credential's `issuanceDate`.
    pub created: Timestamp,
    /// Reference to the signing key: `{issuer_did}#{device_id}`.
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,
    /// Why the proof exists.
    #[serde(rename = "proofPurpose")]
    pub proof_purpose: ProofPurpose,
    /// Lowercase hex Ed25519 signature over the canonical subject bytes.
    pub jws: String,
}
