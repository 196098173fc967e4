//! # Ed25519 Keys and Signatures
//!
//! Newtypes around `ed25519-dalek` with the encodings the rest of the stack
//! relies on: public keys and signatures travel as lowercase hex strings,
//! key pairs persist as the 64-byte keypair encoding (seed || public key).
//!
//! ## Security Invariant
//!
//! - `Ed25519KeyPair` does not implement `Serialize`, `Display`, or a
//!   revealing `Debug`. The only way private material leaves this type is
//!   [`Ed25519KeyPair::to_keypair_hex`], which exists for the key store's
//!   at-rest format and nothing else.
//! - The 64-byte keypair encoding carries the public half alongside the
//!   seed, so halves from different generations are detected on decode.
//!
//! ## Serde
//!
//! Public keys and signatures serialize and deserialize as hex strings.

use ed25519_dalek::Signer as _;
use ed25519_dalek::Verifier as _;
use mrv_core::CryptoError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// An Ed25519 public key (32 bytes) for signature verification.
///
/// Serializes as a 64-character hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes).
///
/// Serializes as a 128-character hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 key pair for signing operations.
///
/// Does not implement `Serialize`; private keys must not leak into logs,
/// responses, or artifacts.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Create a public key from raw 32 bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the public key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }

    /// Parse a public key from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.trim().to_lowercase();
        if hex.len() != 64 {
            return Err(CryptoError::InvalidEncoding {
                what: "public key",
                reason: format!("hex must be 64 chars, got {}", hex.len()),
            });
        }
        let bytes = hex_decode(&hex).map_err(|reason| CryptoError::InvalidEncoding {
            what: "public key",
            reason,
        })?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// A short log-safe identifier for this key: the first 8 hex chars of
    /// its SHA-256 digest.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0);
        hex_encode(&digest[..4])
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature impls
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render the signature as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }

    /// Parse a signature from a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.trim().to_lowercase();
        if hex.len() != 128 {
            return Err(CryptoError::InvalidEncoding {
                what: "signature",
                reason: format!("hex must be 128 chars, got {}", hex.len()),
            });
        }
        let bytes = hex_decode(&hex).map_err(|reason| CryptoError::InvalidEncoding {
            what: "signature",
            reason,
        })?;
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair impls
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn generate() -> Self {
        let mut csprng = rand_core::OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    /// Create a key pair from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message. Pure and deterministic: the same key and message
    /// always produce the same signature.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }

    /// Render the 64-byte keypair encoding (seed || public key) as a
    /// 128-character hex string.
    ///
    /// This is the at-rest format for the key store and the only API that
    /// exposes private material. Callers must zeroize the returned string
    /// once written.
    pub fn to_keypair_hex(&self) -> String {
        let mut bytes = self.signing_key.to_keypair_bytes();
        let hex = hex_encode(&bytes);
        bytes.zeroize();
        hex
    }

    /// Parse a key pair from its 128-character keypair hex encoding.
    ///
    /// Fails if the hex is malformed, the length is wrong, or the embedded
    /// public half does not match the seed. The last case means the halves
    /// were mixed from different generations.
    pub fn from_keypair_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.trim().to_lowercase();
        if hex.len() != 128 {
            return Err(CryptoError::InvalidEncoding {
                what: "key pair",
                reason: format!("hex must be 128 chars, got {}", hex.len()),
            });
        }
        let mut bytes = hex_decode(&hex).map_err(|reason| CryptoError::InvalidEncoding {
            what: "key pair",
            reason,
        })?;
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        bytes.zeroize();
        let result = ed25519_dalek::SigningKey::from_keypair_bytes(&arr).map_err(|e| {
            CryptoError::InvalidEncoding {
                what: "key pair",
                reason: format!("halves do not form a valid key pair: {e}"),
            }
        });
        arr.zeroize();
        Ok(Self {
            signing_key: result?,
        })
    }
}

impl Clone for Ed25519KeyPair {
    fn clone(&self) -> Self {
        Self {
            signing_key: self.signing_key.clone(),
        }
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify an Ed25519 signature over a message.
///
/// Stateless: depends only on its three inputs. Returns `false` for any
/// cryptographically invalid combination, including 32-byte sequences that
/// are not valid curve points. Malformed input of the correct length is a
/// negative result, never a panic.
pub fn verify(
    public_key: &Ed25519PublicKey,
    message: &[u8],
    signature: &Ed25519Signature,
) -> bool {
    let Ok(vk) = ed25519_dalek::VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify(message, &sig).is_ok()
}

// ---------------------------------------------------------------------------
// Hex utilities (no external hex crate dependency)
// ---------------------------------------------------------------------------

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub(crate) fn hex_decode(hex: &str) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err("hex string must have even length".to_string());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| format!("invalid hex at position {i}: {e}"))
        })
        .collect()
}

fn hex_prefix(bytes: &[u8]) -> String {
    hex_encode(&bytes[..4.min(bytes.len())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let kp = Ed25519KeyPair::generate();
        assert_eq!(kp.public_key().as_bytes().len(), 32);
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = Ed25519KeyPair::generate();
        let message = b"device A1 daily usage";
        let sig = kp.sign(message);
        assert!(verify(&kp.public_key(), message, &sig));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let kp = Ed25519KeyPair::generate();
        let message = b"same input";
        assert_eq!(kp.sign(message), kp.sign(message));
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let kp1 = Ed25519KeyPair::generate();
        let kp2 = Ed25519KeyPair::generate();
        let sig = kp1.sign(b"message");
        assert!(!verify(&kp2.public_key(), b"message", &sig));
    }

    #[test]
    fn test_verify_wrong_message_fails() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(b"original");
        assert!(!verify(&kp.public_key(), b"tampered", &sig));
    }

    #[test]
    fn test_verify_invalid_point_is_false_not_panic() {
        // All-0xFF is not a valid curve point but has the correct length.
        let bogus = Ed25519PublicKey([0xFF; 32]);
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(b"m");
        assert!(!verify(&bogus, b"m", &sig));
    }

    #[test]
    fn test_single_bit_flip_breaks_signature() {
        let kp = Ed25519KeyPair::generate();
        let message = b"flip me";
        let sig = kp.sign(message);
        let pk = kp.public_key();

        for byte in 0..64 {
            for bit in 0..8 {
                let mut tampered = sig.0;
                tampered[byte] ^= 1 << bit;
                assert!(
                    !verify(&pk, message, &Ed25519Signature(tampered)),
                    "flipped bit {bit} of byte {byte} still verified"
                );
            }
        }
    }

    #[test]
    fn test_deterministic_from_seed() {
        let seed = [42u8; 32];
        let kp1 = Ed25519KeyPair::from_seed(&seed);
        let kp2 = Ed25519KeyPair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.sign(b"x"), kp2.sign(b"x"));
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = Ed25519KeyPair::generate().public_key();
        let hex = pk.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(Ed25519PublicKey::from_hex(&hex).unwrap(), pk);
    }

    #[test]
    fn test_signature_hex_roundtrip() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(b"payload");
        let hex = sig.to_hex();
        assert_eq!(hex.len(), 128);
        assert_eq!(Ed25519Signature::from_hex(&hex).unwrap(), sig);
    }

    #[test]
    fn test_keypair_hex_roundtrip() {
        let kp = Ed25519KeyPair::generate();
        let hex = kp.to_keypair_hex();
        assert_eq!(hex.len(), 128);
        let restored = Ed25519KeyPair::from_keypair_hex(&hex).unwrap();
        assert_eq!(restored.public_key(), kp.public_key());
        assert_eq!(restored.sign(b"m"), kp.sign(b"m"));
    }

    #[test]
    fn test_keypair_hex_rejects_mixed_halves() {
        let kp1 = Ed25519KeyPair::generate();
        let kp2 = Ed25519KeyPair::generate();
        // Seed of kp1 with the public half of kp2.
        let mixed = format!(
            "{}{}",
            &kp1.to_keypair_hex()[..64],
            kp2.public_key().to_hex()
        );
        assert!(Ed25519KeyPair::from_keypair_hex(&mixed).is_err());
    }

    #[test]
    fn test_public_key_serde_roundtrip() {
        let pk = Ed25519KeyPair::generate().public_key();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json.len(), 64 + 2); // hex chars + quotes
        let back: Ed25519PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(pk, back);
    }

    #[test]
    fn test_signature_serde_roundtrip() {
        let sig = Ed25519KeyPair::generate().sign(b"z");
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json.len(), 128 + 2);
        let back: Ed25519Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, back);
    }

    #[test]
    fn test_public_key_invalid_hex() {
        assert!(Ed25519PublicKey::from_hex("not-hex").is_err());
        assert!(Ed25519PublicKey::from_hex("aabb").is_err());
        assert!(Ed25519PublicKey::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn test_signature_invalid_hex() {
        assert!(Ed25519Signature::from_hex("not-hex").is_err());
        assert!(Ed25519Signature::from_hex("00").is_err());
        assert!(Ed25519Signature::from_hex(&"g".repeat(128)).is_err());
    }

    #[test]
    fn test_debug_does_not_leak_private_key() {
        let kp = Ed25519KeyPair::generate();
        let debug = format!("{kp:?}");
        assert_eq!(debug, "Ed25519KeyPair(<private>)");
        assert!(!debug.contains("SigningKey"));
    }

    #[test]
    fn test_debug_public_key_shows_prefix_only() {
        let pk = Ed25519KeyPair::generate().public_key();
        let debug = format!("{pk:?}");
        assert!(debug.starts_with("Ed25519PublicKey("));
        assert!(debug.ends_with("...)"));
        assert!(debug.len() < 40);
    }

    #[test]
    fn test_fingerprint_is_short_and_stable() {
        let pk = Ed25519KeyPair::generate().public_key();
        let fp = pk.fingerprint();
        assert_eq!(fp.len(), 8);
        assert_eq!(fp, pk.fingerprint());
        assert!(!pk.to_hex().contains(&fp)); // digest, not a key prefix
    }
}
