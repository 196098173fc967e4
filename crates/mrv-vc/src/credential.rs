//! Credential structure and canonical subject bytes.
//!
//! A credential is assembled in two steps: [`CredentialEnvelope::build`]
//! produces everything except the proof, then [`CredentialEnvelope::attach_proof`]
//! completes it. The signature never covers the envelope, only the RFC 8785
//! canonical form of the subject, so re-verification does not depend on how
//! the surrounding JSON was formatted in transit.

use mrv_core::{CanonicalBytes, CanonicalError, Timestamp, UsageFact};
use mrv_crypto::{verify, Ed25519PublicKey, Ed25519Signature};
use serde::{Deserialize, Serialize};

use crate::error::VcError;
use crate::issuer::IssuerConfig;
use crate::proof::Proof;

/// The claims a credential attests: one device, one calendar day, one
/// energy value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialSubject {
    /// Stable device identifier.
    pub device_id: String,
    /// Calendar date of the reading, `YYYY-MM-DD`.
    pub date: String,
    /// Daily energy usage. Must be finite.
    pub value: f64,
}

impl CredentialSubject {
    /// Build the subject from a usage fact.
    pub fn from_fact(fact: &UsageFact) -> Self {
        Self {
            device_id: fact.device_id.clone(),
            date: fact.date.clone(),
            value: fact.value,
        }
    }

    /// The canonical byte sequence signatures cover.
    ///
    /// Non-finite values are rejected here, before JSON conversion would
    /// silently turn them into `null` and collapse distinct subjects onto
    /// the same bytes.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, CanonicalError> {
        if !self.value.is_finite() {
            return Err(CanonicalError::NonFiniteNumber(self.value));
        }
        CanonicalBytes::new(self)
    }
}

impl From<&UsageFact> for CredentialSubject {
    fn from(fact: &UsageFact) -> Self {
        Self::from_fact(fact)
    }
}

/// An unsigned credential: every field except the proof.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialEnvelope {
    /// `urn:uuid:{device_id}-{issuance timestamp}`.
    pub id: String,
    /// Credential type array.
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// Issuer DID.
    pub issuer: String,
    /// When the credential was issued.
    #[serde(rename = "issuanceDate")]
    pub issuance_date: Timestamp,
    /// JSON-LD contexts.
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// The attested claims.
    #[serde(rename = "credentialSubject")]
    pub credential_subject: CredentialSubject,
}

impl CredentialEnvelope {
    /// Assemble the unsigned credential for a usage fact.
    pub fn build(fact: &UsageFact, issuer: &IssuerConfig, issued_at: Timestamp) -> Self {
        Self {
            id: format!("urn:uuid:{}-{}", fact.device_id, issued_at.to_iso8601()),
            types: issuer.credential_types.clone(),
            issuer: issuer.did.clone(),
            issuance_date: issued_at,
            context: issuer.context.clone(),
            credential_subject: CredentialSubject::from_fact(fact),
        }
    }

    /// Attach a proof, completing the credential.
    pub fn attach_proof(self, proof: Proof) -> VerifiableCredential {
        VerifiableCredential {
            id: self.id,
            types: self.types,
            issuer: self.issuer,
            issuance_date: self.issuance_date,
            context: self.context,
            credential_subject: self.credential_subject,
            proof,
        }
    }
}

/// A complete, signed verifiable credential.
///
/// Wire field order: `id`, `type`, `issuer`, `issuanceDate`, `@context`,
/// `credentialSubject`, `proof`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiableCredential {
    /// Credential identifier.
    pub id: String,
    /// Credential type array.
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// Issuer DID.
    pub issuer: String,
    /// When the credential was issued.
    #[serde(rename = "issuanceDate")]
    pub issuance_date: Timestamp,
    /// JSON-LD contexts.
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// The attested claims.
    #[serde(rename = "credentialSubject")]
    pub credential_subject: CredentialSubject,
    /// The proof over the canonical subject bytes.
    pub proof: Proof,
}

impl VerifiableCredential {
    /// Check the proof against a public key.
    ///
    /// Re-canonicalizes the subject and verifies the `jws` signature over
    /// those bytes. Undecodable `jws` hex is an error, not a negative
    /// result.
    pub fn verify(&self, public_key: &Ed25519PublicKey) -> Result<bool, VcError> {
        let bytes = self.credential_subject.canonical_bytes()?;
        let signature = Ed25519Signature::from_hex(&self.proof.jws)?;
        Ok(verify(public_key, bytes.as_bytes(), &signature))
    }
}
