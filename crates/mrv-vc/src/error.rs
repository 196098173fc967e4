//! Issuance and verification errors.

use mrv_anchor_client::AnchorError;
use mrv_core::{CanonicalError, CryptoError, KeyStoreError};

/// Everything that can go wrong while issuing or verifying a credential.
///
/// All variants are fatal for the operation that raised them; this layer
/// never retries.
#[derive(Debug, thiserror::Error)]
pub enum VcError {
    /// The subject could not be canonicalized.
    #[error("credential build failed: {0}")]
    Build(#[from] CanonicalError),

    /// The key store could not provide a usable key pair.
    #[error("key store failure: {0}")]
    Key(#[from] KeyStoreError),

    /// Local signing or signature decoding failed.
    #[error("{0}")]
    Signing(#[from] CryptoError),

    /// The remote anchor failed to produce a signature.
    #[error("anchor signing failed: {0}")]
    Anchor(#[from] AnchorError),

    /// The caller's deadline passed before signing started.
    #[error("issuance deadline expired")]
    DeadlineExpired,

    /// The usage fact is not issuable as given.
    #[error("invalid fact: {0}")]
    InvalidFact(String),
}
