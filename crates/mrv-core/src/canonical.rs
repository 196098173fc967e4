//! # Canonical Serialization (JCS)
//!
//! This module defines `CanonicalBytes`, the sole construction path for the
//! bytes that get signed and verified across the stack.
//!
//! ## Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through [`CanonicalBytes::new()`], which normalizes the
//! JSON value tree and then serializes with `serde_jcs` (RFC 8785: sorted
//! keys, compact separators, ES6 number rendering). Any function that signs
//! or verifies credential content accepts `&CanonicalBytes`, so a
//! non-canonical byte sequence can never reach the signer by construction.
//!
//! ## Numeric policy
//!
//! Measured energy values are finite floats, so floats are admitted.
//! RFC 8785 gives them a deterministic shortest-form rendering
//! (`12.34` → `12.34`, `12.0` → `12`). Two edge cases are handled here:
//!
//! - Zero-valued floats normalize to the integer `0` before serialization.
//!   IEEE 754 `-0.0 == 0.0`, so equal inputs must produce identical bytes;
//!   routing both zeros through the integer path guarantees that without
//!   depending on any serializer's signed-zero behavior.
//! - Non-finite values cannot appear inside a `serde_json::Value` (they
//!   become `null` during conversion), so they must be rejected *before*
//!   conversion. [`crate::UsageFact`] and the credential subject perform
//!   that check; see `CanonicalError::NonFiniteNumber`.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalError;

/// Bytes produced exclusively by JCS canonicalization with the stack's
/// numeric normalization.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - Object keys are sorted lexicographically; separators are compact.
/// - Zero-valued floats serialize as integer `0`.
/// - Output is UTF-8 JSON.
///
/// The inner `Vec<u8>` is private, so downstream code cannot fabricate a
/// "canonical" sequence through any other path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalError::SerializationFailed` if the value cannot be
    /// represented as JSON or JCS serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalError> {
        let value = serde_json::to_value(obj)?;
        let normalized = normalize_json_value(value);
        let bytes = serialize_canonical(&normalized)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes for signing or verification.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively normalize a JSON value tree before JCS serialization.
///
/// - `null`, `bool`, `string`, integers: pass through unchanged.
/// - Floats equal to zero (`0.0` and `-0.0`): replaced with integer `0`.
/// - Other floats: pass through; RFC 8785 renders them deterministically.
/// - Objects and arrays: elements recursed.
fn normalize_json_value(value: Value) -> Value {
    match value {
        Value::Number(ref n) => {
            if let Some(f) = n.as_f64() {
                if n.is_f64() && f == 0.0 {
                    return Value::Number(0.into());
                }
            }
            value
        }
        Value::Object(map) => {
            let normalized = map
                .into_iter()
                .map(|(k, v)| (k, normalize_json_value(v)))
                .collect();
            Value::Object(normalized)
        }
        Value::Array(arr) => {
            Value::Array(arr.into_iter().map(normalize_json_value).collect())
        }
        other => other,
    }
}

/// Serialize a JSON value in JCS-canonical form (RFC 8785).
///
/// Sorted keys, compact separators, no trailing whitespace, UTF-8 output.
fn serialize_canonical(value: &Value) -> Result<Vec<u8>, CanonicalError> {
    let s = serde_jcs::to_string(value)?;
    Ok(s.into_bytes())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for JSON-compatible values with finite floats only.
    fn json_value_finite() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            (-1.0e12..1.0e12f64).prop_map(|f| serde_json::json!(f)),
            "[a-zA-Z0-9_ ]{0,50}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,10}", inner, 0..8).prop_map(|m| {
                    let map: serde_json::Map<String, Value> = m.into_iter().collect();
                    Value::Object(map)
                }),
            ]
        })
    }

    proptest! {
        /// Canonicalization never panics for JSON-representable values.
        #[test]
        fn canonical_bytes_never_panics(value in json_value_finite()) {
            let result = CanonicalBytes::new(&value);
            prop_assert!(result.is_ok(), "canonicalization failed: {:?}", result.err());
        }

        /// Same input always produces byte-identical output.
        #[test]
        fn canonical_bytes_deterministic(value in json_value_finite()) {
            let a = CanonicalBytes::new(&value).unwrap();
            let b = CanonicalBytes::new(&value).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        /// Canonical bytes are valid UTF-8.
        #[test]
        fn canonical_bytes_valid_utf8(value in json_value_finite()) {
            let cb = CanonicalBytes::new(&value).unwrap();
            prop_assert!(std::str::from_utf8(cb.as_bytes()).is_ok());
        }

        /// Canonical bytes parse back as JSON.
        #[test]
        fn canonical_bytes_valid_json(value in json_value_finite()) {
            let cb = CanonicalBytes::new(&value).unwrap();
            let parsed: Result<Value, _> = serde_json::from_slice(cb.as_bytes());
            prop_assert!(parsed.is_ok(), "not valid JSON: {:?}", parsed.err());
        }

        /// Object keys come out sorted.
        #[test]
        fn canonical_bytes_sorted_keys(
            keys in prop::collection::btree_set("[a-z]{1,8}", 2..6)
        ) {
            let map: serde_json::Map<String, Value> = keys
                .iter()
                .enumerate()
                .map(|(i, k)| (k.clone(), serde_json::json!(i)))
                .collect();
            let cb = CanonicalBytes::new(&Value::Object(map)).unwrap();
            let parsed: serde_json::Map<String, Value> =
                serde_json::from_slice(cb.as_bytes()).unwrap();
            let output_keys: Vec<&String> = parsed.keys().collect();
            let mut sorted = output_keys.clone();
            sorted.sort();
            prop_assert_eq!(output_keys, sorted);
        }
    }
}
