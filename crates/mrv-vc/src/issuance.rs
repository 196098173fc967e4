//! Credential issuance pipeline.
//!
//! Ties the pieces together: deadline check, key lookup, canonicalization,
//! signing (local key pair or remote anchor), proof assembly. Every failure
//! is fatal for the request; retries belong to callers.

use std::sync::Arc;
use std::time::Instant;

use mrv_anchor_client::AnchorSigner;
use mrv_core::{Timestamp, UsageFact};
use mrv_crypto::{Ed25519PublicKey, KeyStore, Signer as _};

use crate::credential::{CredentialEnvelope, VerifiableCredential};
use crate::error::VcError;
use crate::issuer::IssuerConfig;
use crate::proof::{Proof, ProofPurpose, ProofType};

/// A signed credential together with the public key that verifies it.
///
/// The public key rides along because issuance responses include it
/// verbatim.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    /// The complete signed credential.
    pub credential: VerifiableCredential,
    /// Public half of the device key that produced the proof.
    pub public_key: Ed25519PublicKey,
}

/// Issues credentials for usage facts.
pub struct CredentialIssuer {
    issuer: IssuerConfig,
    keystore: Arc<dyn KeyStore>,
    anchor: Option<AnchorSigner>,
}

impl CredentialIssuer {
    /// An issuer signing locally with key pairs from `keystore`.
    pub fn new(issuer: IssuerConfig, keystore: Arc<dyn KeyStore>) -> Self {
        Self {
            issuer,
            keystore,
            anchor: None,
        }
    }

    /// Route signing through a remote anchor.
    ///
    /// The key store still provides the public half for responses; the
    /// anchor is assumed to hold a mirror of the device key.
    pub fn with_anchor(mut self, anchor: AnchorSigner) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// The issuer identity stamped into credentials.
    pub fn issuer_config(&self) -> &IssuerConfig {
        &self.issuer
    }

    /// Issue a credential for a usage fact.
    ///
    /// `deadline` bounds the whole pipeline: once passed, issuance aborts
    /// before touching the key store, so an overloaded store cannot make a
    /// doomed request slower still.
    pub async fn issue(
        &self,
        fact: &UsageFact,
        deadline: Option<Instant>,
    ) -> Result<IssuedCredential, VcError> {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(VcError::DeadlineExpired);
            }
        }
        if fact.device_id.is_empty() {
            return Err(VcError::InvalidFact("device_id is empty".to_string()));
        }
        if fact.date.is_empty() {
            return Err(VcError::InvalidFact("date is empty".to_string()));
        }

        let keypair = self.keystore.get_or_create(&fact.device_id)?;
        let issued_at = Timestamp::now();
        let envelope = CredentialEnvelope::build(fact, &self.issuer, issued_at);
        let bytes = envelope.credential_subject.canonical_bytes()?;

        let signature = match &self.anchor {
            Some(anchor) => anchor.sign(&fact.device_id, bytes.as_bytes()).await?,
            None => keypair.try_sign(bytes.as_bytes())?,
        };

        let proof = Proof {
            proof_type: ProofType::Ed25519Signature2018,
            created: issued_at,
            verification_method: self.issuer.verification_method(&fact.device_id),
            proof_purpose: ProofPurpose::AssertionMethod,
            jws: signature.to_hex(),
        };

        let public_key = keypair.public_key();
        tracing::debug!(
            device_id = %fact.device_id,
            date = %fact.date,
            fingerprint = %public_key.fingerprint(),
            "issued credential"
        );

        Ok(IssuedCredential {
            credential: envelope.attach_proof(proof),
            public_key,
        })
    }
}
