//! Signing and verification traits.
//!
//! `Signer` is the seam between credential issuance and key material: local
//! key pairs implement it directly, and remote signing services can stand in
//! behind the same trait. `Verifier` is the read-only counterpart.

use crate::ed25519::{self, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use mrv_core::CryptoError;

/// Produces Ed25519 signatures over arbitrary byte messages.
pub trait Signer: Send + Sync {
    /// Sign a message, or report why signing is impossible.
    fn try_sign(&self, message: &[u8]) -> Result<Ed25519Signature, CryptoError>;
}

/// Checks Ed25519 signatures over arbitrary byte messages.
pub trait Verifier: Send + Sync {
    /// Whether `signature` is a valid signature over `message`.
    ///
    /// Malformed key material yields `false`, never a panic.
    fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> bool;
}

impl Signer for Ed25519KeyPair {
    fn try_sign(&self, message: &[u8]) -> Result<Ed25519Signature, CryptoError> {
        Ok(self.sign(message))
    }
}

impl Verifier for Ed25519PublicKey {
    fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> bool {
        ed25519::verify(self, message, signature)
    }
}

/// Verify a signature where all inputs arrive as strings, the way they do
/// over HTTP or a CLI.
///
/// Returns an error for undecodable inputs (so callers can answer 400
/// instead of 401) and `Ok(false)` for a well-formed signature that simply
/// does not verify. The message is signed as its UTF-8 bytes.
pub fn verify_hex_inputs(
    public_key_hex: &str,
    message: &str,
    signature_hex: &str,
) -> Result<bool, CryptoError> {
    let public_key = Ed25519PublicKey::from_hex(public_key_hex)?;
    let signature = Ed25519Signature::from_hex(signature_hex)?;
    Ok(ed25519::verify(&public_key, message.as_bytes(), &signature))
}
